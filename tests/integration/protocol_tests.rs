//! Protocol negotiation against a mock upstream server

#[cfg(test)]
mod tests {
    use crate::assert_ok;
    use odoo_gateway::config::UpstreamConfig;
    use odoo_gateway::core::upstream::{
        DomainTerm, FieldValue, Protocol, ProtocolClient, SearchOptions,
    };
    use odoo_gateway::GatewayError;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn upstream_config(server: &MockServer) -> UpstreamConfig {
        UpstreamConfig {
            url: format!("{}/", server.uri()),
            database: "prod".to_string(),
            username: "bot@example.com".to_string(),
            password: "secret".to_string(),
            api_key: None,
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    fn xml_response(value: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/xml")
            .set_body_string(format!(
                "<?xml version='1.0'?>\n<methodResponse><params><param><value>{}</value></param></params></methodResponse>",
                value
            ))
    }

    fn xml_fault(code: i64, message: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(format!(
            "<?xml version='1.0'?>\n<methodResponse><fault><value><struct>\
             <member><name>faultCode</name><value><int>{}</int></value></member>\
             <member><name>faultString</name><value><string>{}</string></value></member>\
             </struct></value></fault></methodResponse>",
            code, message
        ))
    }

    const PARTNER_ROWS: &str = "<array><data><value><struct>\
        <member><name>id</name><value><int>7</int></value></member>\
        <member><name>name</name><value><string>Azure Interior</string></value></member>\
        </struct></value></data></array>";

    async fn mount_legacy_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/xmlrpc/2/common"))
            .and(body_string_contains("authenticate"))
            .respond_with(xml_response("<int>2</int>"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_modern_protocol_when_json_api_is_available() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/json/2/auth"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"uid": 2, "access_token": "tok"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/json/2/res.partner/search_count"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(3)))
            .expect(2)
            .mount(&server)
            .await;

        let client = assert_ok!(ProtocolClient::new(&upstream_config(&server)));
        let domain = vec![DomainTerm::condition("is_company", "=", true)];
        assert_eq!(assert_ok!(client.search_count("res.partner", &domain).await), 3);
        assert_eq!(assert_ok!(client.search_count("res.partner", &domain).await), 3);

        let snapshot = client.snapshot().await;
        assert_eq!(snapshot.protocol, Some(Protocol::Modern));
        assert!(!snapshot.downgraded);
    }

    #[tokio::test]
    async fn test_legacy_login_when_json_auth_is_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/json/2/auth"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        mount_legacy_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/xmlrpc/2/object"))
            .and(body_string_contains("search_read"))
            .respond_with(xml_response(PARTNER_ROWS))
            .expect(1)
            .mount(&server)
            .await;

        let client = assert_ok!(ProtocolClient::new(&upstream_config(&server)));
        let rows = assert_ok!(
            client
                .search_read("res.partner", &SearchOptions::default())
                .await
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&FieldValue::from("Azure Interior")));
        assert_eq!(client.protocol().await, Some(Protocol::Legacy));
    }

    #[tokio::test]
    async fn test_missing_json_endpoint_downgrades_permanently() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/json/2/auth"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"uid": 2, "access_token": "tok"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/json/2/res.partner/search_read"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        mount_legacy_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/xmlrpc/2/object"))
            .and(body_string_contains("search_read"))
            .respond_with(xml_response(PARTNER_ROWS))
            .expect(2)
            .mount(&server)
            .await;

        let client = assert_ok!(ProtocolClient::new(&upstream_config(&server)));
        for _ in 0..2 {
            let rows = assert_ok!(
                client
                    .search_read("res.partner", &SearchOptions::default())
                    .await
            );
            assert_eq!(rows[0].get("id"), Some(&FieldValue::Int(7)));
        }

        let snapshot = client.snapshot().await;
        assert!(snapshot.downgraded);
        assert_eq!(snapshot.protocol, Some(Protocol::Legacy));
    }

    #[tokio::test]
    async fn test_rejected_credentials_surface_as_upstream_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/json/2/auth"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/xmlrpc/2/common"))
            .respond_with(xml_response("<boolean>0</boolean>"))
            .mount(&server)
            .await;

        let client = assert_ok!(ProtocolClient::new(&upstream_config(&server)));
        let err = client
            .search_count("res.partner", &[])
            .await
            .expect_err("login should fail");
        assert!(matches!(err, GatewayError::UpstreamAuth(_)));
        assert_eq!(err.status_code().as_u16(), 502);
    }

    #[tokio::test]
    async fn test_legacy_fault_is_an_upstream_call_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/json/2/auth"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        mount_legacy_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/xmlrpc/2/object"))
            .respond_with(xml_fault(2, "Invalid field 'colour' on model 'res.partner'"))
            .mount(&server)
            .await;

        let client = assert_ok!(ProtocolClient::new(&upstream_config(&server)));
        let err = client
            .create(
                "res.partner",
                [("colour".to_string(), FieldValue::from("blue"))]
                    .into_iter()
                    .collect(),
            )
            .await
            .expect_err("fault should fail the call");
        assert!(matches!(err, GatewayError::UpstreamCall(_)));
        assert!(err.to_string().contains("colour"));
    }
}
