//! Configuration management for the Gateway
//!
//! This module handles loading, validation, and management of all gateway configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GatewayError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the Gateway
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let gateway: GatewayConfig = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(Self { gateway })
    }

    /// Load configuration from `.env` and environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let _ = dotenvy::dotenv();

        let gateway = GatewayConfig::from_env()?;
        Ok(Self { gateway })
    }

    /// Load the file (when given and present), apply environment overrides, then validate
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path).await?,
            Some(path) => {
                info!("Config file {:?} not found, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        let _ = dotenvy::dotenv();
        config
            .gateway
            .apply_env_overrides(|name| std::env::var(name).ok())?;

        config.validate()?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.gateway.server
    }

    /// Get upstream configuration
    pub fn upstream(&self) -> &UpstreamConfig {
        &self.gateway.upstream
    }

    /// Get storage configuration
    pub fn storage(&self) -> &StorageConfig {
        &self.gateway.storage
    }

    /// Get logging configuration
    pub fn logging(&self) -> &LoggingConfig {
        &self.gateway.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.gateway
            .validate()
            .map_err(|e| GatewayError::Config(format!("Invalid configuration: {}", e)))?;

        crate::config::models::auth::warn_insecure_config(&self.gateway.auth);

        Ok(())
    }

    /// Convert to YAML string (secrets are skipped)
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.gateway)
            .map_err(|e| GatewayError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_from_file() {
        let config_content = r#"
server:
  host: "127.0.0.1"
  port: 8080

upstream:
  url: "https://erp.example.com"
  database: "prod"
  username: "admin"
  password: "secret"
  timeout_seconds: 10

rate_limit:
  default_rpm: 120
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.server().host, "127.0.0.1");
        assert_eq!(config.server().port, 8080);
        assert_eq!(config.upstream().database, "prod");
        assert_eq!(config.upstream().timeout_seconds, 10);
        assert_eq!(config.gateway.rate_limit.default_rpm, 120);
        assert_eq!(config.gateway.audit.retention_days, 30);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_config_from_missing_file() {
        let result = Config::from_file("/nonexistent/gateway.yaml").await;
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[tokio::test]
    async fn test_config_from_malformed_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"server: [unclosed").unwrap();

        let result = Config::from_file(temp_file.path()).await;
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_yaml_omits_secrets() {
        let mut config = Config::default();
        config.gateway.upstream.password = "hunter2".to_string();
        config.gateway.upstream.api_key = Some("upstream-key".to_string());

        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("hunter2"));
        assert!(!yaml.contains("upstream-key"));
    }
}
