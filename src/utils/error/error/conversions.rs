//! Type conversions for GatewayError

use super::types::GatewayError;

impl From<tokio::time::error::Elapsed> for GatewayError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        GatewayError::UpstreamTimeout("upstream did not answer in time".to_string())
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        GatewayError::Config(format!("Invalid URL: {}", err))
    }
}

impl From<hex::FromHexError> for GatewayError {
    fn from(err: hex::FromHexError) -> Self {
        GatewayError::Crypto(format!("Invalid hex encoding: {}", err))
    }
}

impl From<actix_web::error::JsonPayloadError> for GatewayError {
    fn from(err: actix_web::error::JsonPayloadError) -> Self {
        GatewayError::validation(format!("Invalid JSON payload: {}", err))
    }
}
