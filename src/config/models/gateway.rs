//! Main gateway configuration

#![allow(missing_docs)]

use super::*;
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings that are safe to show to any caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicConfig {
    pub require_api_keys: bool,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests_per_minute: u32,
    pub upstream_timeout_seconds: u64,
    pub audit_enabled: bool,
    pub audit_retention_days: u32,
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| GatewayError::Config(format!("Invalid value for {}: {}", name, e)))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GatewayError::Config(format!(
            "Invalid value for {}: expected a boolean, got '{}'",
            name, other
        ))),
    }
}

impl GatewayConfig {
    /// Build configuration from defaults plus the process environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Override fields from environment-style variables.
    ///
    /// `lookup` resolves a variable name to its value; unset variables leave
    /// the current value untouched.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ODOO_URL") {
            self.upstream.url = v;
        }
        if let Some(v) = lookup("ODOO_DATABASE") {
            self.upstream.database = v;
        }
        if let Some(v) = lookup("ODOO_USERNAME") {
            self.upstream.username = v;
        }
        if let Some(v) = lookup("ODOO_PASSWORD") {
            self.upstream.password = v;
        }
        if let Some(v) = lookup("ODOO_API_KEY") {
            self.upstream.api_key = Some(v).filter(|k| !k.is_empty());
        }
        if let Some(v) = lookup("UPSTREAM_TIMEOUT_SECONDS") {
            self.upstream.timeout_seconds = parse_var("UPSTREAM_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = lookup("GATEWAY_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("GATEWAY_PORT") {
            self.server.port = parse_var("GATEWAY_PORT", &v)?;
        }
        if let Some(v) = lookup("GATEWAY_DEV_MODE") {
            self.server.dev_mode = parse_bool("GATEWAY_DEV_MODE", &v)?;
        }
        if let Some(v) = lookup("REQUIRE_API_KEYS") {
            self.auth.require_api_keys = parse_bool("REQUIRE_API_KEYS", &v)?;
        }
        if let Some(v) = lookup("RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = parse_bool("RATE_LIMIT_ENABLED", &v)?;
        }
        if let Some(v) = lookup("RATE_LIMIT_REQUESTS_PER_MINUTE") {
            self.rate_limit.default_rpm = parse_var("RATE_LIMIT_REQUESTS_PER_MINUTE", &v)?;
        }
        if let Some(v) = lookup("LOG_ENABLED") {
            self.audit.enabled = parse_bool("LOG_ENABLED", &v)?;
        }
        if let Some(v) = lookup("LOG_RETENTION_DAYS") {
            self.audit.retention_days = parse_var("LOG_RETENTION_DAYS", &v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            self.logging.format = parse_var("LOG_FORMAT", &v)?;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.storage.database.url = v;
        }
        Ok(())
    }

    /// Secret-free view of the configuration
    pub fn public(&self) -> PublicConfig {
        PublicConfig {
            require_api_keys: self.auth.require_api_keys,
            rate_limit_enabled: self.rate_limit.enabled,
            rate_limit_requests_per_minute: self.rate_limit.default_rpm,
            upstream_timeout_seconds: self.upstream.timeout_seconds,
            audit_enabled: self.audit.enabled,
            audit_retention_days: self.audit.retention_days,
        }
    }
}
