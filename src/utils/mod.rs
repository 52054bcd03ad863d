//! Utility modules for the gateway
//!
//! - **auth**: key generation, hashing and constant-time comparison
//! - **error**: the `GatewayError` type and its HTTP mapping
//! - **logging**: tracing subscriber setup

pub mod auth;
pub mod error;
pub mod logging;

use uuid::Uuid;

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Truncate a string to at most `max_chars` characters, never splitting a character
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}
