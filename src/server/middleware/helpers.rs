//! Helper functions for middleware

use super::request_id::RequestId;
use crate::core::gateway::CallerContext;
use actix_web::http::header::{self, HeaderMap};
use actix_web::{HttpMessage, HttpRequest};

/// Extract the presented API key.
///
/// Accepts `Authorization: Bearer <key>`, `Authorization: ApiKey <key>` and
/// `X-API-Key: <key>`.
pub fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_str) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        let key = auth_str
            .strip_prefix("Bearer ")
            .or_else(|| auth_str.strip_prefix("ApiKey "))
            .map(str::trim)
            .filter(|key| !key.is_empty());
        if key.is_some() {
            return key.map(str::to_string);
        }
    }

    headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// Correlation id assigned by [`RequestIdMiddleware`](super::RequestIdMiddleware)
pub fn request_id(req: &HttpRequest) -> Option<String> {
    req.extensions().get::<RequestId>().map(|id| id.0.clone())
}

/// Everything the gateway needs to know about the caller of `req`
pub fn caller_context(req: &HttpRequest) -> CallerContext {
    CallerContext {
        api_key: extract_api_key(req.headers()),
        // The socket peer; forwarding headers are caller-controlled
        source_ip: req.peer_addr().map(|addr| addr.ip().to_string()),
        user_agent: req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        request_id: request_id(req),
    }
}
