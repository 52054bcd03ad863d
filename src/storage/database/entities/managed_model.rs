use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Managed model allow-list database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "available_models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Technical model name
    #[sea_orm(unique)]
    pub model: String,

    pub name: String,

    pub description: Option<String>,

    pub enabled: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> crate::core::models::ManagedModel {
        crate::core::models::ManagedModel {
            id: self.id,
            model: self.model.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            enabled: self.enabled,
            created_at: self.created_at.with_timezone(&chrono::Utc),
        }
    }
}
