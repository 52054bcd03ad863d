//! Helper functions for creating and classifying errors

use super::types::GatewayError;
use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};

/// Helper functions for creating specific errors
impl GatewayError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn invalid_field<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn unauthenticated<S: Into<String>>(message: S) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn rate_limited<S: Into<String>>(message: S, reset_at: Option<DateTime<Utc>>) -> Self {
        Self::RateLimited {
            message: message.into(),
            reset_at,
        }
    }

    pub fn upstream_auth<S: Into<String>>(message: S) -> Self {
        Self::UpstreamAuth(message.into())
    }

    pub fn upstream_call<S: Into<String>>(message: S) -> Self {
        Self::UpstreamCall(message.into())
    }

    pub fn upstream_timeout<S: Into<String>>(message: S) -> Self {
        Self::UpstreamTimeout(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl GatewayError {
    /// HTTP status used for responses and audit entries
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::UpstreamAuth(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamCall(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Serialization(_) => StatusCode::BAD_REQUEST,
            GatewayError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Storage(_)
            | GatewayError::Database(_)
            | GatewayError::Config(_)
            | GatewayError::Yaml(_)
            | GatewayError::Io(_)
            | GatewayError::Crypto(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Validation { .. } => "VALIDATION_ERROR",
            GatewayError::Unauthenticated(_) => "UNAUTHENTICATED",
            GatewayError::RateLimited { .. } => "RATE_LIMITED",
            GatewayError::UpstreamAuth(_) => "UPSTREAM_AUTH_ERROR",
            GatewayError::UpstreamCall(_) => "UPSTREAM_CALL_ERROR",
            GatewayError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            GatewayError::Storage(_) | GatewayError::Database(_) => "STORAGE_ERROR",
            GatewayError::Config(_) | GatewayError::Yaml(_) => "CONFIG_ERROR",
            GatewayError::HttpClient(_) => "UPSTREAM_CALL_ERROR",
            GatewayError::Serialization(_) => "INVALID_PAYLOAD",
            GatewayError::Io(_) => "IO_ERROR",
            GatewayError::NotFound(_) => "NOT_FOUND",
            GatewayError::Crypto(_) | GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to callers.
    ///
    /// Local failures are reported generically; their text only reaches the
    /// response as `detail` in development mode.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Storage(_) | GatewayError::Database(_) => {
                "Storage operation failed".to_string()
            }
            GatewayError::Config(_)
            | GatewayError::Yaml(_)
            | GatewayError::Io(_)
            | GatewayError::Crypto(_)
            | GatewayError::Internal(_) => "An internal error occurred".to_string(),
            GatewayError::HttpClient(_) => "Upstream request failed".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the error was decided locally rather than by the upstream system
    pub fn is_local(&self) -> bool {
        !matches!(
            self,
            GatewayError::UpstreamAuth(_)
                | GatewayError::UpstreamCall(_)
                | GatewayError::UpstreamTimeout(_)
                | GatewayError::HttpClient(_)
        )
    }
}
