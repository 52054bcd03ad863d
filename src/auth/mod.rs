//! Caller authentication
//!
//! API key issuance and verification.

pub mod api_key;

pub use api_key::ApiKeyHandler;
pub use api_key::types::{IssueKeyRequest, IssuedKey};
