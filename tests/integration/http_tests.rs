//! HTTP surface tests over a file-backed database

#[cfg(test)]
mod tests {
    use crate::common::ScriptedUpstream;
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use odoo_gateway::config::{Config, GatewayConfig};
    use odoo_gateway::core::upstream::{FieldValue, ProtocolClient};
    use odoo_gateway::server::{AppState, HttpServer, ServerBuilder};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir) -> Config {
        let mut gateway = GatewayConfig::default();
        gateway.auth.require_api_keys = true;
        gateway.storage.database.url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("gateway.db").display()
        );
        Config { gateway }
    }

    async fn build_state(config: Config) -> AppState {
        let upstream = ProtocolClient::with_transports(
            Arc::new(ScriptedUpstream::modern().answering(|_| Ok(FieldValue::Int(42)))),
            Arc::new(ScriptedUpstream::legacy()),
            Duration::from_secs(2),
        );
        let server = ServerBuilder::new()
            .with_config(config)
            .with_upstream(Arc::new(upstream))
            .build()
            .await
            .expect("Failed to build server");
        server.state().clone()
    }

    #[actix_web::test]
    async fn test_keys_and_audit_survive_restart() {
        let dir = TempDir::new().unwrap();

        let key = {
            let state = build_state(file_config(&dir)).await;
            let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;

            let req = test::TestRequest::post()
                .uri("/api/keys")
                .set_json(json!({ "name": "reporting", "owner": "finance", "rate_limit_rpm": 10 }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let body: Value = test::read_body_json(resp).await;
            let key = body["data"]["key"].as_str().unwrap().to_string();
            assert!(body["data"].get("key_hash").is_none());

            let req = test::TestRequest::post()
                .uri("/api/models/res.partner/count")
                .insert_header(("Authorization", format!("Bearer {}", key)))
                .set_json(json!({ "domain": [["customer_rank", ">", 0]] }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["data"], json!(42));

            key
        };

        // A fresh process over the same database
        let state = build_state(file_config(&dir)).await;
        let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;

        let req = test::TestRequest::get()
            .uri("/api/logs?owner=finance")
            .insert_header(("X-API-Key", key.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let operations: Vec<&str> = body["data"]["entries"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["operation"].as_str())
            .collect();
        assert!(operations.contains(&"count_records"));
    }

    #[actix_web::test]
    async fn test_protected_routes_require_a_key() {
        let dir = TempDir::new().unwrap();
        let state = build_state(file_config(&dir)).await;
        let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;

        let req = test::TestRequest::get().uri("/api/models").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().contains_key("x-request-id"));
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }
}
