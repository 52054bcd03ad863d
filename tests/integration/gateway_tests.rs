//! End-to-end tests of the gated call pipeline

#[cfg(test)]
mod tests {
    use crate::common::{ScriptedUpstream, TestGateway, issue_key, open_config};
    use crate::{assert_err, assert_ok};
    use odoo_gateway::config::GatewayConfig;
    use odoo_gateway::core::models::{AuditQuery, NewManagedModel};
    use odoo_gateway::core::upstream::{
        DomainTerm, FieldValue, Protocol, SearchOptions, TransportError, UpstreamMethod,
    };
    use odoo_gateway::{
        CallerContext, GatewayError, GatewayOperation, OperationResult, ToolCall, call_tool,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn partner_rows() -> FieldValue {
        FieldValue::from(vec![FieldValue::from(
            [
                ("id".to_string(), FieldValue::Int(7)),
                ("name".to_string(), FieldValue::from("Azure Interior")),
            ]
            .into_iter()
            .collect::<odoo_gateway::core::upstream::Record>(),
        )])
    }

    fn search_partners() -> GatewayOperation {
        GatewayOperation::SearchRecords {
            model: "res.partner".to_string(),
            options: SearchOptions::with_domain(vec![DomainTerm::condition(
                "is_company",
                "=",
                true,
            )]),
        }
    }

    fn count_partners() -> GatewayOperation {
        GatewayOperation::CountRecords {
            model: "res.partner".to_string(),
            domain: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_keyed_budget_is_enforced_and_audited() {
        let mut config = GatewayConfig::default();
        config.auth.require_api_keys = true;
        let upstream = ScriptedUpstream::modern().answering(|_| Ok(partner_rows()));
        let env = TestGateway::new(config, upstream).await;

        let key = issue_key(&env.gateway, "acme", Some(3)).await;
        let ctx = CallerContext::anonymous("10.0.0.5").with_api_key(key);

        for _ in 0..3 {
            let result = assert_ok!(env.gateway.execute(&ctx, search_partners()).await);
            assert_eq!(result.count(), Some(1));
        }
        let err = assert_err!(env.gateway.execute(&ctx, search_partners()).await);
        assert!(matches!(err, GatewayError::RateLimited { .. }));

        // The rejected call never reached the upstream
        assert_eq!(env.modern.exec_calls(), 3);

        let stats = assert_ok!(env.gateway.audit().stats().await);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status.success, 3);
        assert_eq!(stats.by_status.client_error, 1);

        let page = assert_ok!(
            env.gateway
                .audit()
                .query(
                    &AuditQuery {
                        owner: Some("acme".to_string()),
                        ..Default::default()
                    },
                    None,
                    0,
                )
                .await
        );
        assert_eq!(page.total, 4);
        let newest = &page.entries[0];
        assert_eq!(newest.response_status, 429);
        assert_eq!(newest.operation, "search_records");
        assert!(newest.api_key_id.is_some());
        assert_eq!(newest.source_ip.as_deref(), Some("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_missing_key_is_rejected_when_required() {
        let mut config = GatewayConfig::default();
        config.auth.require_api_keys = true;
        let env = TestGateway::new(config, ScriptedUpstream::modern()).await;

        let ctx = CallerContext::anonymous("10.0.0.9");
        let err = assert_err!(env.gateway.execute(&ctx, count_partners()).await);
        assert!(matches!(err, GatewayError::Unauthenticated(_)));
        assert_eq!(env.modern.auth_calls(), 0);

        let page = assert_ok!(env.gateway.audit().query(&AuditQuery::default(), None, 0).await);
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].identity, "ip:10.0.0.9");
        assert_eq!(page.entries[0].response_status, 401);
    }

    #[tokio::test]
    async fn test_invalid_key_is_rejected_even_when_keys_are_optional() {
        let env = TestGateway::new(open_config(), ScriptedUpstream::modern()).await;

        let ctx = CallerContext::anonymous("10.0.0.9").with_api_key("ogw_not-a-real-key");
        let err = assert_err!(env.gateway.execute(&ctx, count_partners()).await);
        assert!(matches!(err, GatewayError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_anonymous_callers_share_a_per_address_budget() {
        let mut config = open_config();
        config.rate_limit.default_rpm = 2;
        let upstream = ScriptedUpstream::modern().answering(|_| Ok(FieldValue::Int(4)));
        let env = TestGateway::new(config, upstream).await;

        let first = CallerContext::anonymous("192.0.2.1");
        let second = CallerContext::anonymous("192.0.2.2");

        assert_ok!(env.gateway.execute(&first, count_partners()).await);
        assert_ok!(env.gateway.execute(&first, count_partners()).await);
        assert_err!(env.gateway.execute(&first, count_partners()).await);
        assert_eq!(
            assert_ok!(env.gateway.execute(&second, count_partners()).await),
            OperationResult::Count(4)
        );

        let page = assert_ok!(
            env.gateway
                .audit()
                .query(
                    &AuditQuery {
                        identity: Some("ip:192.0.2.1".to_string()),
                        ..Default::default()
                    },
                    None,
                    0,
                )
                .await
        );
        assert_eq!(page.total, 3);
        assert!(page.entries.iter().all(|e| e.api_key_id.is_none()));
    }

    #[tokio::test]
    async fn test_downgrade_to_legacy_is_permanent() {
        let legacy = ScriptedUpstream::legacy().answering(|call| match call.method {
            UpstreamMethod::SearchCount => Ok(FieldValue::Int(7)),
            _ => Ok(FieldValue::List(Vec::new())),
        });
        let env = TestGateway::with_legacy(
            open_config(),
            ScriptedUpstream::modern().without_json_api(),
            legacy,
        )
        .await;
        let ctx = CallerContext::anonymous("127.0.0.1");

        for _ in 0..3 {
            let result = assert_ok!(env.gateway.execute(&ctx, count_partners()).await);
            assert_eq!(result, OperationResult::Count(7));
        }

        assert_eq!(env.modern.auth_calls(), 1);
        assert_eq!(env.modern.exec_calls(), 1);
        assert_eq!(env.legacy.auth_calls(), 1);
        assert_eq!(env.legacy.exec_calls(), 3);

        let snapshot = env.gateway.upstream().snapshot().await;
        assert!(snapshot.downgraded);
        assert_eq!(snapshot.protocol, Some(Protocol::Legacy));
    }

    #[tokio::test]
    async fn test_read_timeouts_are_retried_writes_are_not() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        let upstream = ScriptedUpstream::modern().answering(move |call| {
            if call.method == UpstreamMethod::Create {
                return Err(TransportError::Timeout);
            }
            match seen.fetch_add(1, Ordering::SeqCst) {
                0 => Err(TransportError::Timeout),
                _ => Ok(FieldValue::Int(11)),
            }
        });
        let env = TestGateway::new(open_config(), upstream).await;
        let ctx = CallerContext::anonymous("127.0.0.1");

        let result = assert_ok!(env.gateway.execute(&ctx, count_partners()).await);
        assert_eq!(result, OperationResult::Count(11));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        let create = GatewayOperation::CreateRecord {
            model: "res.partner".to_string(),
            values: [("name".to_string(), FieldValue::from("Deco Addict"))]
                .into_iter()
                .collect(),
        };
        let err = assert_err!(env.gateway.execute(&ctx, create).await);
        assert!(matches!(err, GatewayError::UpstreamTimeout(_)));
        assert_eq!(env.modern.exec_calls(), 3);
    }

    #[tokio::test]
    async fn test_upstream_fault_is_reported_and_audited() {
        let upstream = ScriptedUpstream::modern().answering(|_| {
            Err(TransportError::Fault {
                code: 2,
                message: "Invalid field 'colour' on model 'res.partner'".to_string(),
            })
        });
        let env = TestGateway::new(open_config(), upstream).await;
        let ctx = CallerContext::anonymous("127.0.0.1").with_request_id("trace-fault");

        let err = assert_err!(env.gateway.execute(&ctx, search_partners()).await);
        assert!(matches!(err, GatewayError::UpstreamCall(_)));
        assert_eq!(err.status_code().as_u16(), 502);

        let page = assert_ok!(env.gateway.audit().query(&AuditQuery::default(), None, 0).await);
        let entry = &page.entries[0];
        assert_eq!(entry.request_id, "trace-fault");
        assert_eq!(entry.response_status, 502);
        assert!(
            entry
                .error_message
                .as_deref()
                .is_some_and(|m| m.contains("colour"))
        );
        assert!(
            entry
                .request_payload
                .as_deref()
                .is_some_and(|p| p.contains("is_company"))
        );
    }

    #[tokio::test]
    async fn test_allow_list_limits_models() {
        let mut config = open_config();
        config.upstream.enforce_model_allow_list = true;
        let upstream = ScriptedUpstream::modern().answering(|_| Ok(FieldValue::Int(1)));
        let env = TestGateway::new(config, upstream).await;
        let ctx = CallerContext::anonymous("127.0.0.1");

        let err = assert_err!(env.gateway.execute(&ctx, count_partners()).await);
        assert!(matches!(err, GatewayError::Validation { .. }));
        assert_eq!(env.modern.exec_calls(), 0);

        assert_ok!(
            env.gateway
                .upsert_managed_model(
                    &ctx,
                    NewManagedModel {
                        model: "res.partner".to_string(),
                        name: "Contact".to_string(),
                        description: None,
                        enabled: true,
                    },
                )
                .await
        );
        assert_ok!(env.gateway.execute(&ctx, count_partners()).await);
        assert_eq!(env.modern.exec_calls(), 1);
    }

    #[tokio::test]
    async fn test_tool_call_runs_through_gateway() {
        let upstream = ScriptedUpstream::modern().answering(|_| Ok(partner_rows()));
        let env = TestGateway::new(open_config(), upstream).await;
        let ctx = CallerContext::anonymous("127.0.0.1");

        let call = ToolCall {
            name: "odoo_search_records".to_string(),
            arguments: json!({
                "model": "res.partner",
                "domain": [["is_company", "=", true]],
                "fields": ["name"],
                "limit": 5
            }),
        };
        let result = call_tool(&env.gateway, &ctx, &call).await;
        assert!(!result.is_error);
        assert!(result.text_content().contains("Azure Interior"));

        let sent = env.modern.calls();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, UpstreamMethod::SearchRead);
        assert_eq!(sent[0].kwargs.get("limit"), Some(&FieldValue::Int(5)));

        let bad = ToolCall {
            name: "odoo_search_records".to_string(),
            arguments: json!({ "model": "res.partner", "limit": 0 }),
        };
        let result = call_tool(&env.gateway, &ctx, &bad).await;
        assert!(result.is_error);
        assert!(result.text_content().contains("limit"));
        assert_eq!(env.modern.exec_calls(), 1);
    }
}
