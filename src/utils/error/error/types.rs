//! Error types for the Gateway

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for the Gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the Gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed caller input
    #[error("Validation error: {message}")]
    Validation {
        /// Offending input field, when one can be named
        field: Option<String>,
        message: String,
    },

    /// Missing, invalid, expired or revoked API key
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Rate budget exhausted
    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        /// Estimated time at which at least one request is admitted again
        reset_at: Option<DateTime<Utc>>,
    },

    /// Neither upstream protocol accepted the configured credentials
    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    /// An upstream operation failed after protocol negotiation
    #[error("Upstream call failed: {0}")]
    UpstreamCall(String),

    /// Bounded upstream wait exceeded
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Local persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Crypto errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}
