//! HTTP middleware implementations
//!
//! - Request ID tracking
//! - Caller extraction helpers for gated routes

mod helpers;
mod request_id;


pub use helpers::{caller_context, extract_api_key, request_id};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdMiddleware, RequestIdMiddlewareService};
