//! Startup sequence: storage, upstream client, gateway, HTTP server

use crate::config::Config;
use crate::core::gateway::Gateway;
use crate::core::upstream::ProtocolClient;
use crate::server::server::HttpServer;
use crate::storage::StorageLayer;
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Server builder that assembles every component from configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    upstream: Option<Arc<ProtocolClient>>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a prepared upstream client instead of one built from configuration
    pub fn with_upstream(mut self, upstream: Arc<ProtocolClient>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// Connect storage, migrate, prune the audit log once, assemble the
    /// gateway and spawn its maintenance task
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::Config("Configuration is required".to_string()))?;

        let storage = StorageLayer::new(&config.gateway.storage).await?;
        storage.migrate().await?;
        let storage = Arc::new(storage);

        let upstream = match self.upstream {
            Some(upstream) => upstream,
            None => Arc::new(ProtocolClient::new(&config.gateway.upstream)?),
        };

        let gateway = Arc::new(Gateway::new(config.gateway.clone(), storage, upstream));
        match gateway.audit().prune_expired().await {
            Ok(0) => {}
            Ok(removed) => info!("Pruned {} expired audit entries", removed),
            Err(e) => warn!("Initial audit pruning failed: {}", e),
        }

        let maintenance = gateway.clone().start_maintenance();
        Ok(HttpServer::new(config, gateway).with_maintenance(maintenance))
    }
}

/// Build everything from `config` and serve until shutdown
pub async fn run_server(config: Config) -> Result<()> {
    info!("Starting Odoo gateway v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Upstream: {} (database '{}')",
        config.upstream().url,
        config.upstream().database
    );

    let server = ServerBuilder::new().with_config(config).build().await?;
    info!(
        "Serving at http://{}:{}",
        server.config().host,
        server.config().port
    );
    info!("   GET  /health - Health check");
    info!("   GET  /api/models - Model catalog");
    info!("   POST /api/models/{{model}}/search - Search records");
    info!("   POST /api/tools/{{name}} - Tool calls");

    server.start().await
}
