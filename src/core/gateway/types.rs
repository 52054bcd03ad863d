//! Gateway request and result types

use crate::core::models::ApiKeyRecord;
use crate::core::upstream::types::domain_value;
use crate::core::upstream::{DomainTerm, FieldValue, ModelInfo, Record, SearchOptions};
use serde::Serialize;
use serde_json::{Value, json};

/// What the transport layer knows about the caller
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    /// Raw bearer key, if one was presented
    pub api_key: Option<String>,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
    /// Correlation id; generated when absent
    pub request_id: Option<String>,
}

impl CallerContext {
    pub fn anonymous(source_ip: impl Into<String>) -> Self {
        Self {
            source_ip: Some(source_ip.into()),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Rate-limit identity for callers without a key
    pub fn anonymous_identity(&self) -> String {
        format!("ip:{}", self.source_ip.as_deref().unwrap_or("unknown"))
    }
}

/// Caller after authentication
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// API key id, or `ip:<addr>`
    pub identity: String,
    pub api_key: Option<ApiKeyRecord>,
    /// Requests per minute
    pub budget: u32,
}

impl CallerIdentity {
    pub fn keyed(record: ApiKeyRecord) -> Self {
        Self {
            identity: record.id.clone(),
            budget: record.rate_limit_rpm,
            api_key: Some(record),
        }
    }

    pub fn anonymous(identity: String, budget: u32) -> Self {
        Self {
            identity,
            api_key: None,
            budget,
        }
    }

    pub fn api_key_id(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.id.as_str())
    }

    pub fn owner(&self) -> Option<&str> {
        self.api_key.as_ref().and_then(|k| k.owner.as_deref())
    }
}

/// Upstream operations exposed through the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayOperation {
    SearchRecords {
        model: String,
        options: SearchOptions,
    },
    ReadRecords {
        model: String,
        ids: Vec<i64>,
        fields: Option<Vec<String>>,
    },
    CountRecords {
        model: String,
        domain: Vec<DomainTerm>,
    },
    CreateRecord {
        model: String,
        values: Record,
    },
    UpdateRecords {
        model: String,
        ids: Vec<i64>,
        values: Record,
    },
    DeleteRecords {
        model: String,
        ids: Vec<i64>,
    },
    GetModelFields {
        model: String,
    },
    ListModels,
}

impl GatewayOperation {
    /// Stable name recorded in audit entries
    pub fn name(&self) -> &'static str {
        match self {
            GatewayOperation::SearchRecords { .. } => "search_records",
            GatewayOperation::ReadRecords { .. } => "read_records",
            GatewayOperation::CountRecords { .. } => "count_records",
            GatewayOperation::CreateRecord { .. } => "create_record",
            GatewayOperation::UpdateRecords { .. } => "update_records",
            GatewayOperation::DeleteRecords { .. } => "delete_records",
            GatewayOperation::GetModelFields { .. } => "get_model_fields",
            GatewayOperation::ListModels => "list_models",
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            GatewayOperation::SearchRecords { model, .. }
            | GatewayOperation::ReadRecords { model, .. }
            | GatewayOperation::CountRecords { model, .. }
            | GatewayOperation::CreateRecord { model, .. }
            | GatewayOperation::UpdateRecords { model, .. }
            | GatewayOperation::DeleteRecords { model, .. }
            | GatewayOperation::GetModelFields { model } => Some(model),
            GatewayOperation::ListModels => None,
        }
    }

    /// Read-class operations may be retried
    pub fn is_read(&self) -> bool {
        !matches!(
            self,
            GatewayOperation::CreateRecord { .. }
                | GatewayOperation::UpdateRecords { .. }
                | GatewayOperation::DeleteRecords { .. }
        )
    }

    pub fn success_status(&self) -> u16 {
        match self {
            GatewayOperation::CreateRecord { .. } => 201,
            _ => 200,
        }
    }

    /// Request description stored with the audit entry
    pub fn payload(&self) -> Value {
        let values = |values: &Record| Value::from(FieldValue::Map(values.clone()));
        match self {
            GatewayOperation::SearchRecords { model, options } => json!({
                "model": model,
                "domain": Value::from(domain_value(&options.domain)),
                "fields": options.fields,
                "limit": options.limit,
                "offset": options.offset,
                "order": options.order,
            }),
            GatewayOperation::ReadRecords { model, ids, fields } => {
                json!({ "model": model, "ids": ids, "fields": fields })
            }
            GatewayOperation::CountRecords { model, domain } => {
                json!({ "model": model, "domain": Value::from(domain_value(domain)) })
            }
            GatewayOperation::CreateRecord { model, values: v } => {
                json!({ "model": model, "values": values(v) })
            }
            GatewayOperation::UpdateRecords {
                model,
                ids,
                values: v,
            } => json!({ "model": model, "ids": ids, "values": values(v) }),
            GatewayOperation::DeleteRecords { model, ids } => json!({ "model": model, "ids": ids }),
            GatewayOperation::GetModelFields { model } => json!({ "model": model }),
            GatewayOperation::ListModels => json!({}),
        }
    }
}

/// Successful result of a [`GatewayOperation`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    Records(Vec<Record>),
    Count(u64),
    Created { id: i64 },
    Updated { updated: bool },
    Deleted { deleted: bool },
    Fields(Record),
    Models(Vec<ModelInfo>),
}

impl OperationResult {
    /// Number of items for list-shaped results
    pub fn count(&self) -> Option<usize> {
        match self {
            OperationResult::Records(records) => Some(records.len()),
            OperationResult::Models(models) => Some(models.len()),
            _ => None,
        }
    }
}
