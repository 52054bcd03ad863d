//! API key management operations

use super::creation::ApiKeyHandler;
use crate::core::models::ApiKeyRecord;
use crate::utils::error::Result;
use tracing::{debug, info};

impl ApiKeyHandler {
    /// Find an API key by id
    pub async fn find(&self, key_id: &str) -> Result<Option<ApiKeyRecord>> {
        self.storage.db().find_api_key(key_id).await
    }

    /// List API keys, newest first
    pub async fn list(&self, owner: Option<&str>) -> Result<Vec<ApiKeyRecord>> {
        debug!("Listing API keys (owner: {:?})", owner);
        self.storage.db().list_api_keys(owner).await
    }

    /// Mark a key inactive. Returns whether the key exists.
    pub async fn revoke(&self, key_id: &str) -> Result<bool> {
        info!("Revoking API key: {}", key_id);
        self.storage.db().deactivate_api_key(key_id).await
    }

    /// Irreversibly delete a key. Returns whether the key existed.
    pub async fn delete(&self, key_id: &str) -> Result<bool> {
        info!("Deleting API key: {}", key_id);
        self.storage.db().delete_api_key(key_id).await
    }
}
