//! Test fixtures

use super::database::test_storage;
use super::upstream::ScriptedUpstream;
use odoo_gateway::auth::IssueKeyRequest;
use odoo_gateway::config::GatewayConfig;
use odoo_gateway::core::upstream::ProtocolClient;
use odoo_gateway::Gateway;
use std::sync::Arc;
use std::time::Duration;

/// Gateway over in-memory storage and two scripted transports
pub struct TestGateway {
    pub gateway: Arc<Gateway>,
    pub modern: Arc<ScriptedUpstream>,
    pub legacy: Arc<ScriptedUpstream>,
}

impl TestGateway {
    pub async fn new(config: GatewayConfig, modern: ScriptedUpstream) -> Self {
        Self::with_legacy(config, modern, ScriptedUpstream::legacy()).await
    }

    pub async fn with_legacy(
        config: GatewayConfig,
        modern: ScriptedUpstream,
        legacy: ScriptedUpstream,
    ) -> Self {
        let modern = Arc::new(modern);
        let legacy = Arc::new(legacy);
        let upstream = ProtocolClient::with_transports(
            modern.clone(),
            legacy.clone(),
            Duration::from_secs(2),
        );
        let gateway = Gateway::new(config, test_storage().await, Arc::new(upstream));

        Self {
            gateway: Arc::new(gateway),
            modern,
            legacy,
        }
    }
}

/// Defaults with API keys optional
pub fn open_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.require_api_keys = false;
    config
}

/// Issue a key and return its plaintext
pub async fn issue_key(gateway: &Gateway, owner: &str, budget: Option<u32>) -> String {
    gateway
        .api_keys()
        .issue(IssueKeyRequest {
            name: format!("{}-key", owner),
            owner: Some(owner.to_string()),
            rate_limit_rpm: budget,
            ..Default::default()
        })
        .await
        .expect("Failed to issue API key")
        .key
}
