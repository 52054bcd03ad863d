//! Transport abstraction over the two upstream wire protocols

use super::types::{AuthOutcome, FieldValue, Protocol, RpcCall};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a single transport round trip
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// Endpoint or method unknown to the upstream; triggers the protocol downgrade
    #[error("not found: {0}")]
    NotFound(String),

    /// Credential or session rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// Error reported inside an otherwise successful response
    #[error("{0}")]
    Upstream(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Classify a non-success HTTP status
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> TransportError {
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    } else {
        crate::utils::truncate_chars(body.trim(), 200)
    };
    match status.as_u16() {
        404 => TransportError::NotFound(message),
        401 | 403 => TransportError::Unauthorized(message),
        code => TransportError::Rejected {
            status: code,
            message,
        },
    }
}

/// Build the HTTP client shared by both transports
pub fn build_http_client(timeout: Duration) -> crate::utils::error::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("odoo-gateway/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// One upstream wire protocol
#[async_trait]
pub trait ProtocolTransport: Send + Sync {
    /// Which protocol this transport speaks
    fn protocol(&self) -> Protocol;

    /// Authenticate with the configured credentials
    async fn authenticate(&self) -> Result<AuthOutcome, TransportError>;

    /// Execute an object method with a previously obtained authentication
    async fn execute(
        &self,
        auth: &AuthOutcome,
        call: &RpcCall,
    ) -> Result<FieldValue, TransportError>;
}

/// Credentials presented to the upstream by both protocols
#[derive(Clone)]
pub struct Credentials {
    pub database: String,
    pub username: String,
    /// Upstream API key when configured, otherwise the password
    pub secret: String,
}

impl Credentials {
    pub fn from_config(config: &crate::config::models::upstream::UpstreamConfig) -> Self {
        Self {
            database: config.database.clone(),
            username: config.username.clone(),
            secret: config.secret().to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("database", &self.database)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}
