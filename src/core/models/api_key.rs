//! Stored API key record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored credential. The plaintext key is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiKeyRecord {
    /// Opaque id, unrelated to the secret
    pub id: String,
    pub name: String,
    /// `<salt-hex>$<hmac-hex>`
    #[serde(skip_serializing, default)]
    pub key_hash: String,
    /// Non-secret hint such as `odgw_...wxyz`
    pub key_hint: String,
    pub owner: Option<String>,
    /// Requests per 60-second window
    pub rate_limit_rpm: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiKeyRecord {
    /// Whether the expiry has passed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Whether the key may authorize a call at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }
}
