//! HTTP response handling for errors

use super::types::GatewayError;
use actix_web::{HttpResponse, ResponseError, http::header};
use serde::Serialize;

impl ResponseError for GatewayError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        GatewayError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        self.to_http_response(false, None)
    }
}

impl GatewayError {
    /// Normalized error response, with `Retry-After` on rate limiting
    pub fn to_http_response(
        &self,
        expose_detail: bool,
        request_id: Option<String>,
    ) -> HttpResponse {
        let body = ErrorResponse::from_error(self, expose_detail).with_request_id(request_id);
        let mut builder = HttpResponse::build(GatewayError::status_code(self));

        if let GatewayError::RateLimited {
            reset_at: Some(reset_at),
            ..
        } = self
        {
            let wait = (*reset_at - chrono::Utc::now()).num_seconds().max(1);
            builder.insert_header((header::RETRY_AFTER, wait.to_string()));
        }

        builder.json(body)
    }
}

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Underlying error text, only populated in development mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: i64,
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Build the caller-facing body for an error
    pub fn from_error(err: &GatewayError, expose_detail: bool) -> Self {
        let (field, reset_at) = match err {
            GatewayError::Validation { field, .. } => (field.clone(), None),
            GatewayError::RateLimited { reset_at, .. } => (None, *reset_at),
            _ => (None, None),
        };

        Self {
            error: ErrorDetail {
                code: err.error_code().to_string(),
                message: err.public_message(),
                field,
                reset_at,
                detail: expose_detail.then(|| err.to_string()),
                timestamp: chrono::Utc::now().timestamp(),
                request_id: None,
            },
        }
    }

    /// Attach the request id assigned by middleware
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.error.request_id = request_id;
        self
    }
}
