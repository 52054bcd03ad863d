//! API key types and data structures
//!
//! This module contains request/response types for API key management.

use crate::core::models::ApiKeyRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted key name
pub const MAX_KEY_NAME_LENGTH: usize = 255;

/// API key issuance request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueKeyRequest {
    /// Key name/description
    pub name: String,
    /// Free-form owner reference
    #[serde(default)]
    pub owner: Option<String>,
    /// Expiration date
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Requests per minute; the configured default when absent
    #[serde(default)]
    pub rate_limit_rpm: Option<u32>,
}

/// Result of issuance. `key` is the only copy of the plaintext.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedKey {
    #[serde(flatten)]
    pub record: ApiKeyRecord,
    pub key: String,
}
