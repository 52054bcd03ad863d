//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

#![allow(missing_docs)]

pub mod audit;
pub mod auth;
pub mod gateway;
pub mod logging;
pub mod rate_limit;
pub mod server;
pub mod storage;
pub mod upstream;

pub use audit::*;
pub use auth::*;
pub use gateway::*;
pub use logging::*;
pub use rate_limit::*;
pub use server::*;
pub use storage::*;
pub use upstream::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    3000
}

/// Default upstream URL
pub fn default_upstream_url() -> String {
    "http://localhost:8069".to_string()
}

/// Default upstream timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

pub fn default_read_retries() -> u32 {
    1
}

pub fn default_rpm() -> u32 {
    300
}

pub fn default_retention_days() -> u32 {
    30
}

pub fn default_max_payload_chars() -> usize {
    1000
}

pub fn default_prune_interval_hours() -> u64 {
    24
}

pub fn default_database_url() -> String {
    "sqlite://data/gateway.db?mode=rwc".to_string()
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_true() -> bool {
    true
}
