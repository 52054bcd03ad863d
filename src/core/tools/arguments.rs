//! Tool argument validation
//!
//! Arguments are checked here, before anything reaches the gateway. Every
//! failure names the offending argument.

use super::definitions::{
    CREATE_RECORD, DELETE_RECORD, GET_MODEL_FIELDS, LIST_MODELS, SEARCH_RECORDS, UPDATE_RECORD,
};
use crate::core::gateway::GatewayOperation;
use crate::core::upstream::{DomainTerm, FieldValue, Record, SearchOptions};
use crate::utils::error::{GatewayError, Result};
use serde_json::{Map, Value};

/// Largest page a tool may request
pub const MAX_LIMIT: u64 = 1000;

/// Turn a tool call into a gateway operation
pub fn parse_tool_call(name: &str, arguments: &Value) -> Result<GatewayOperation> {
    let empty = Map::new();
    let args = match arguments {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => return Err(GatewayError::validation("arguments must be an object")),
    };

    match name {
        SEARCH_RECORDS => Ok(GatewayOperation::SearchRecords {
            model: model(args)?,
            options: search_options(args)?,
        }),
        CREATE_RECORD => Ok(GatewayOperation::CreateRecord {
            model: model(args)?,
            values: values(args.get("values"))?,
        }),
        UPDATE_RECORD => Ok(GatewayOperation::UpdateRecords {
            model: model(args)?,
            ids: ids(args.get("ids"))?,
            values: values(args.get("values"))?,
        }),
        DELETE_RECORD => Ok(GatewayOperation::DeleteRecords {
            model: model(args)?,
            ids: ids(args.get("ids"))?,
        }),
        GET_MODEL_FIELDS => Ok(GatewayOperation::GetModelFields {
            model: model(args)?,
        }),
        LIST_MODELS => Ok(GatewayOperation::ListModels),
        other => Err(GatewayError::invalid_field(
            "name",
            format!("unknown tool '{}'", other),
        )),
    }
}

/// Domain, fields, paging and ordering from an argument object
pub fn search_options(args: &Map<String, Value>) -> Result<SearchOptions> {
    Ok(SearchOptions {
        domain: domain(args.get("domain"))?,
        fields: fields(args.get("fields"))?,
        limit: limit(args.get("limit"))?,
        offset: offset(args.get("offset"))?,
        order: order(args.get("order"))?,
    })
}

fn model(args: &Map<String, Value>) -> Result<String> {
    match args.get("model") {
        Some(Value::String(model)) if !model.trim().is_empty() => Ok(model.trim().to_string()),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            Err(GatewayError::invalid_field("model", "model is required"))
        }
        Some(_) => Err(GatewayError::invalid_field("model", "model must be a string")),
    }
}

/// Parse a search domain: comparison triples and prefix connectives
pub fn domain(value: Option<&Value>) -> Result<Vec<DomainTerm>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(GatewayError::invalid_field("domain", "domain must be a list")),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(op) if op == "&" => Ok(DomainTerm::And),
            Value::String(op) if op == "|" => Ok(DomainTerm::Or),
            Value::String(op) if op == "!" => Ok(DomainTerm::Not),
            Value::Array(triple) if triple.len() == 3 => {
                match (&triple[0], &triple[1]) {
                    (Value::String(field), Value::String(operator)) => {
                        Ok(DomainTerm::condition(
                            field.as_str(),
                            operator.as_str(),
                            FieldValue::from(triple[2].clone()),
                        ))
                    }
                    _ => Err(GatewayError::invalid_field(
                        "domain",
                        format!("domain item {} must start with a field name and an operator", i),
                    )),
                }
            }
            _ => Err(GatewayError::invalid_field(
                "domain",
                format!(
                    "domain item {} must be a [field, operator, value] triple or one of '&', '|', '!'",
                    i
                ),
            )),
        })
        .collect()
}

pub fn fields(value: Option<&Value>) -> Result<Option<Vec<String>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| GatewayError::invalid_field("fields", "fields must be strings"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(_) => Err(GatewayError::invalid_field("fields", "fields must be a list")),
    }
}

pub fn limit(value: Option<&Value>) -> Result<Option<u32>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(Some(n as u32)),
            _ => Err(GatewayError::invalid_field(
                "limit",
                format!("limit must be an integer between 1 and {}", MAX_LIMIT),
            )),
        },
    }
}

pub fn offset(value: Option<&Value>) -> Result<Option<u32>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                GatewayError::invalid_field("offset", "offset must be a non-negative integer")
            }),
    }
}

pub fn order(value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(order)) => Ok(Some(order.clone())),
        Some(_) => Err(GatewayError::invalid_field("order", "order must be a string")),
    }
}

pub fn values(value: Option<&Value>) -> Result<Record> {
    match value {
        Some(Value::Object(map)) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::from(v.clone())))
            .collect()),
        None | Some(Value::Null) => {
            Err(GatewayError::invalid_field("values", "values are required"))
        }
        Some(_) => Err(GatewayError::invalid_field("values", "values must be an object")),
    }
}

pub fn ids(value: Option<&Value>) -> Result<Vec<i64>> {
    let invalid = || {
        GatewayError::invalid_field("ids", "ids must be a non-empty list of positive integers")
    };
    match value {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| item.as_i64().filter(|id| *id > 0).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}
