use crate::core::models::{ManagedModel, NewManagedModel};
use crate::utils::error::{GatewayError, Result};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, managed_model};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// List managed models ordered by display name
    pub async fn list_managed_models(&self, enabled_only: bool) -> Result<Vec<ManagedModel>> {
        let mut query = entities::ManagedModel::find();
        if enabled_only {
            query = query.filter(managed_model::Column::Enabled.eq(true));
        }

        let models = query
            .order_by_asc(managed_model::Column::Name)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(models.iter().map(managed_model::Model::to_domain).collect())
    }

    /// Find a managed model by technical name
    pub async fn find_managed_model(&self, model: &str) -> Result<Option<ManagedModel>> {
        let found = entities::ManagedModel::find()
            .filter(managed_model::Column::Model.eq(model))
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(found.map(|m| m.to_domain()))
    }

    /// Insert a managed model, or update the existing entry with the same name
    pub async fn upsert_managed_model(&self, input: &NewManagedModel) -> Result<ManagedModel> {
        debug!("Upserting managed model: {}", input.model);

        let existing = entities::ManagedModel::find()
            .filter(managed_model::Column::Model.eq(input.model.as_str()))
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let saved = match existing {
            Some(model) => {
                let mut active: managed_model::ActiveModel = model.into();
                active.name = Set(input.name.clone());
                active.description = Set(input.description.clone());
                active.enabled = Set(input.enabled);
                active.update(&self.db).await
            }
            None => {
                managed_model::ActiveModel {
                    id: NotSet,
                    model: Set(input.model.clone()),
                    name: Set(input.name.clone()),
                    description: Set(input.description.clone()),
                    enabled: Set(input.enabled),
                    created_at: Set(chrono::Utc::now().into()),
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(GatewayError::Database)?;

        Ok(saved.to_domain())
    }

    /// Remove a managed model. Returns whether a row was removed.
    pub async fn delete_managed_model(&self, model: &str) -> Result<bool> {
        let result = entities::ManagedModel::delete_many()
            .filter(managed_model::Column::Model.eq(model))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(result.rows_affected > 0)
    }
}
