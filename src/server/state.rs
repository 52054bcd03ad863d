//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::gateway::Gateway;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Cloned into every worker; all fields are `Arc`-wrapped.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// The gated call pipeline and everything it owns
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(config: Config, gateway: Arc<Gateway>) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
        }
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether error bodies carry raw error detail
    pub fn dev_mode(&self) -> bool {
        self.config.gateway.server.dev_mode
    }
}
