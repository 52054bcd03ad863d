//! Upstream (Odoo) connection configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Credentials and call policy for the upstream system
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub url: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Used instead of the password for both protocols when set
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Bound on every upstream call, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Extra attempts for read operations that time out
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
    /// Reject operations on models outside the managed allow-list
    #[serde(default)]
    pub enforce_model_allow_list: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
            api_key: None,
            timeout_seconds: default_timeout(),
            read_retries: default_read_retries(),
            enforce_model_allow_list: false,
        }
    }
}

impl UpstreamConfig {
    /// Secret sent to the upstream: the API key when present, else the password
    pub fn secret(&self) -> &str {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => &self.password,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("read_retries", &self.read_retries)
            .field("enforce_model_allow_list", &self.enforce_model_allow_list)
            .finish()
    }
}
