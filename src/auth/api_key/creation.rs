//! API key issuance and verification

use super::types::{IssueKeyRequest, IssuedKey, MAX_KEY_NAME_LENGTH};
use crate::core::models::ApiKeyRecord;
use crate::storage::StorageLayer;
use crate::utils::auth::crypto::keys::{
    display_hint, generate_api_key, generate_key_id, hash_api_key, verify_api_key_hash,
};
use crate::utils::error::{GatewayError, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// API key handler for authentication and management
#[derive(Debug, Clone)]
pub struct ApiKeyHandler {
    /// Storage layer for persistence
    pub(super) storage: Arc<StorageLayer>,
    /// Budget for keys issued without one
    pub(super) default_rpm: u32,
}

impl ApiKeyHandler {
    /// Create a new API key handler
    pub fn new(storage: Arc<StorageLayer>, default_rpm: u32) -> Self {
        Self {
            storage,
            default_rpm,
        }
    }

    /// Issue a new API key. The plaintext is returned here and nowhere else.
    pub async fn issue(&self, request: IssueKeyRequest) -> Result<IssuedKey> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(GatewayError::invalid_field("name", "name is required"));
        }
        if name.chars().count() > MAX_KEY_NAME_LENGTH {
            return Err(GatewayError::invalid_field(
                "name",
                format!("name must be at most {} characters", MAX_KEY_NAME_LENGTH),
            ));
        }
        let rate_limit_rpm = match request.rate_limit_rpm {
            Some(0) => {
                return Err(GatewayError::invalid_field(
                    "rate_limit_rpm",
                    "rate limit must be at least 1 request per minute",
                ));
            }
            Some(rpm) => rpm,
            None => self.default_rpm,
        };

        info!("Issuing API key: {}", name);

        let raw_key = generate_api_key();
        let record = ApiKeyRecord {
            id: generate_key_id(),
            name: name.to_string(),
            key_hash: hash_api_key(&raw_key)?,
            key_hint: display_hint(&raw_key),
            owner: request.owner.filter(|owner| !owner.trim().is_empty()),
            rate_limit_rpm,
            is_active: true,
            created_at: Utc::now(),
            expires_at: request.expires_at,
            last_used_at: None,
        };

        self.storage.db().create_api_key(&record).await?;

        info!("API key issued: {}", record.id);
        Ok(IssuedKey {
            record,
            key: raw_key,
        })
    }

    /// Verify a plaintext key.
    ///
    /// Every active record is compared with the constant-time primitive; the
    /// first match wins. Expired matches count as no match.
    pub async fn verify(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>> {
        if raw_key.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let candidates = self.storage.db().list_active_api_keys().await?;

        for candidate in candidates {
            let matched = match verify_api_key_hash(raw_key, &candidate.key_hash) {
                Ok(matched) => matched,
                Err(e) => {
                    warn!("Stored hash for key {} is malformed: {}", candidate.id, e);
                    false
                }
            };
            if !matched {
                continue;
            }

            if candidate.is_expired_at(now) {
                debug!("API key {} is expired", candidate.id);
                return Ok(None);
            }

            self.update_last_used(&candidate.id).await;

            let mut record = candidate;
            record.last_used_at = Some(now);
            debug!("API key verified: {}", record.id);
            return Ok(Some(record));
        }

        debug!("API key not found");
        Ok(None)
    }

    /// Refresh last-used; failures are logged, never surfaced
    async fn update_last_used(&self, key_id: &str) {
        if let Err(e) = self.storage.db().touch_api_key(key_id, Utc::now()).await {
            warn!("Failed to update last used timestamp for {}: {}", key_id, e);
        }
    }
}
