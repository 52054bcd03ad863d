//! Per-section configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;
use url::Url;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating gateway configuration");

        self.server.validate()?;
        self.upstream.validate()?;
        self.rate_limit.validate()?;
        self.audit.validate()?;
        self.storage.validate()?;

        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("Server port cannot be 0".to_string());
        }
        if self.workers == Some(0) {
            return Err("Worker count must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for UpstreamConfig {
    fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Upstream URL cannot be empty".to_string());
        }

        let url = Url::parse(&self.url).map_err(|e| format!("Upstream URL is invalid: {}", e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Upstream URL must use http:// or https://, got: {}",
                url.scheme()
            ));
        }

        if self.database.is_empty() {
            return Err("Upstream database cannot be empty".to_string());
        }
        if self.username.is_empty() {
            return Err("Upstream username cannot be empty".to_string());
        }
        if self.secret().is_empty() {
            return Err("Upstream password or API key must be set".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("Upstream timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_rpm == 0 {
            return Err("Default requests per minute must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.retention_days == 0 {
            return Err("Audit retention must be at least one day".to_string());
        }
        if self.prune_interval_hours == 0 {
            return Err("Audit prune interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.database.url.is_empty() {
            return Err("Database URL is required".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max connections must be greater than 0".to_string());
        }
        Ok(())
    }
}
