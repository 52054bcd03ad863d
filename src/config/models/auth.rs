//! Authentication configuration

use super::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require an API key on gated calls
    #[serde(default = "default_true")]
    pub require_api_keys: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_api_keys: true,
        }
    }
}

/// Log a warning for insecure settings
pub fn warn_insecure_config(config: &AuthConfig) {
    if !config.require_api_keys {
        warn!("API key enforcement is disabled; gated calls are accepted anonymously");
    }
}
