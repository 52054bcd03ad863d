use crate::core::models::ApiKeyRecord;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// API key database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "api_keys")]
pub struct Model {
    /// Key ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Salted hash of the key
    pub key_hash: String,

    /// Display hint, never used for lookup
    pub key_hint: String,

    /// Free-form owner reference
    pub owner: Option<String>,

    /// Requests per minute
    pub rate_limit_rpm: i32,

    /// Active flag, cleared on revoke
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub expires_at: Option<DateTimeWithTimeZone>,

    pub last_used_at: Option<DateTimeWithTimeZone>,
}

/// API key entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Audit entries written for this key
    #[sea_orm(has_many = "super::request_log::Entity")]
    RequestLogs,
}

impl Related<super::request_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert database model to domain record
    pub fn to_domain(&self) -> ApiKeyRecord {
        ApiKeyRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            key_hash: self.key_hash.clone(),
            key_hint: self.key_hint.clone(),
            owner: self.owner.clone(),
            rate_limit_rpm: self.rate_limit_rpm.max(1) as u32,
            is_active: self.is_active,
            created_at: self.created_at.with_timezone(&chrono::Utc),
            expires_at: self.expires_at.map(|t| t.with_timezone(&chrono::Utc)),
            last_used_at: self.last_used_at.map(|t| t.with_timezone(&chrono::Utc)),
        }
    }

    /// Convert domain record to an active model for insertion
    pub fn from_domain(record: &ApiKeyRecord) -> ActiveModel {
        ActiveModel {
            id: Set(record.id.clone()),
            name: Set(record.name.clone()),
            key_hash: Set(record.key_hash.clone()),
            key_hint: Set(record.key_hint.clone()),
            owner: Set(record.owner.clone()),
            rate_limit_rpm: Set(i32::try_from(record.rate_limit_rpm).unwrap_or(i32::MAX)),
            is_active: Set(record.is_active),
            created_at: Set(record.created_at.into()),
            expires_at: Set(record.expires_at.map(Into::into)),
            last_used_at: Set(record.last_used_at.map(Into::into)),
        }
    }
}
