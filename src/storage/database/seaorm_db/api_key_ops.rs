use crate::core::models::ApiKeyRecord;
use crate::utils::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, api_key};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Insert a new API key record
    pub async fn create_api_key(&self, record: &ApiKeyRecord) -> Result<()> {
        debug!("Storing API key: {}", record.id);

        entities::ApiKey::insert(api_key::Model::from_domain(record))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(())
    }

    /// Find API key by ID
    pub async fn find_api_key(&self, key_id: &str) -> Result<Option<ApiKeyRecord>> {
        debug!("Finding API key by ID: {}", key_id);

        let model = entities::ApiKey::find_by_id(key_id.to_string())
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(model.map(|m| m.to_domain()))
    }

    /// List API keys, newest first, optionally restricted to one owner
    pub async fn list_api_keys(&self, owner: Option<&str>) -> Result<Vec<ApiKeyRecord>> {
        let mut query = entities::ApiKey::find();
        if let Some(owner) = owner {
            query = query.filter(api_key::Column::Owner.eq(owner));
        }

        let models = query
            .order_by_desc(api_key::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(models.iter().map(api_key::Model::to_domain).collect())
    }

    /// All keys with the active flag set, expired or not
    pub async fn list_active_api_keys(&self) -> Result<Vec<ApiKeyRecord>> {
        let models = entities::ApiKey::find()
            .filter(api_key::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(models.iter().map(api_key::Model::to_domain).collect())
    }

    /// Refresh the last-used timestamp
    pub async fn touch_api_key(&self, key_id: &str, at: DateTime<Utc>) -> Result<()> {
        let at: DateTimeWithTimeZone = at.into();
        entities::ApiKey::update_many()
            .col_expr(api_key::Column::LastUsedAt, Expr::value(Some(at)))
            .filter(api_key::Column::Id.eq(key_id))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(())
    }

    /// Clear the active flag. Returns whether the key exists.
    pub async fn deactivate_api_key(&self, key_id: &str) -> Result<bool> {
        debug!("Deactivating API key: {}", key_id);

        let result = entities::ApiKey::update_many()
            .col_expr(api_key::Column::IsActive, Expr::value(false))
            .filter(api_key::Column::Id.eq(key_id))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(result.rows_affected > 0)
    }

    /// Delete an API key. Returns whether a row was removed.
    pub async fn delete_api_key(&self, key_id: &str) -> Result<bool> {
        debug!("Deleting API key: {}", key_id);

        let result = entities::ApiKey::delete_by_id(key_id.to_string())
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(result.rows_affected > 0)
    }
}
