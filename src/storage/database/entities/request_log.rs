use crate::core::models::AuditEntry;
use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};

/// Request audit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "request_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Correlation ID
    pub request_id: String,

    pub operation: String,

    /// Caller identity, kept even after the key is deleted
    pub identity: String,

    /// Set to NULL when the key is deleted
    pub api_key_id: Option<String>,

    pub owner: Option<String>,

    pub source_ip: Option<String>,

    pub user_agent: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub request_payload: Option<String>,

    pub response_status: i32,

    pub latency_ms: i64,

    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::api_key::Entity",
        from = "Column::ApiKeyId",
        to = "super::api_key::Column::Id",
        on_delete = "SetNull"
    )]
    ApiKey,
}

impl Related<super::api_key::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApiKey.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> AuditEntry {
        AuditEntry {
            id: Some(self.id),
            request_id: self.request_id.clone(),
            operation: self.operation.clone(),
            identity: self.identity.clone(),
            api_key_id: self.api_key_id.clone(),
            owner: self.owner.clone(),
            source_ip: self.source_ip.clone(),
            user_agent: self.user_agent.clone(),
            request_payload: self.request_payload.clone(),
            response_status: u16::try_from(self.response_status).unwrap_or(0),
            latency_ms: u64::try_from(self.latency_ms).unwrap_or(0),
            error_message: self.error_message.clone(),
            created_at: self.created_at.with_timezone(&chrono::Utc),
        }
    }

    pub fn from_domain(entry: &AuditEntry) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            request_id: Set(entry.request_id.clone()),
            operation: Set(entry.operation.clone()),
            identity: Set(entry.identity.clone()),
            api_key_id: Set(entry.api_key_id.clone()),
            owner: Set(entry.owner.clone()),
            source_ip: Set(entry.source_ip.clone()),
            user_agent: Set(entry.user_agent.clone()),
            request_payload: Set(entry.request_payload.clone()),
            response_status: Set(i32::from(entry.response_status)),
            latency_ms: Set(i64::try_from(entry.latency_ms).unwrap_or(i64::MAX)),
            error_message: Set(entry.error_message.clone()),
            created_at: Set(entry.created_at.into()),
        }
    }
}
