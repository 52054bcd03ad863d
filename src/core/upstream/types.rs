//! Value and request types shared by both upstream protocols

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single upstream field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

/// One upstream record, keyed by field name
pub type Record = BTreeMap<String, FieldValue>;

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            FieldValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Upstream truthiness: `false`, `0`, empty strings and empty collections are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Int(i) => *i != 0,
            FieldValue::Float(f) => *f != 0.0,
            FieldValue::String(s) => !s.is_empty(),
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::Map(map) => !map.is_empty(),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Bool(b) => serde_json::Value::Bool(b),
            FieldValue::Int(i) => serde_json::Value::from(i),
            FieldValue::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::String(s) => serde_json::Value::String(s),
            FieldValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            FieldValue::Map(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        FieldValue::Map(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        FieldValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Wire protocol spoken to the upstream system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// JSON endpoints of recent upstream versions
    Modern,
    /// XML-RPC endpoints available on every version
    Legacy,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Modern => write!(f, "modern"),
            Protocol::Legacy => write!(f, "legacy"),
        }
    }
}

/// One element of a search domain in prefix notation
#[derive(Debug, Clone, PartialEq)]
pub enum DomainTerm {
    Condition {
        field: String,
        operator: String,
        value: FieldValue,
    },
    And,
    Or,
    Not,
}

impl DomainTerm {
    pub fn condition<F, O, V>(field: F, operator: O, value: V) -> Self
    where
        F: Into<String>,
        O: Into<String>,
        V: Into<FieldValue>,
    {
        DomainTerm::Condition {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    fn to_value(&self) -> FieldValue {
        match self {
            DomainTerm::Condition {
                field,
                operator,
                value,
            } => FieldValue::List(vec![
                FieldValue::String(field.clone()),
                FieldValue::String(operator.clone()),
                value.clone(),
            ]),
            DomainTerm::And => FieldValue::from("&"),
            DomainTerm::Or => FieldValue::from("|"),
            DomainTerm::Not => FieldValue::from("!"),
        }
    }
}

/// Encode a domain as the nested list both protocols expect
pub fn domain_value(domain: &[DomainTerm]) -> FieldValue {
    FieldValue::List(domain.iter().map(DomainTerm::to_value).collect())
}

/// Options accepted by `search` and `search_read`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub domain: Vec<DomainTerm>,
    pub fields: Option<Vec<String>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order: Option<String>,
}

impl SearchOptions {
    pub fn with_domain(domain: Vec<DomainTerm>) -> Self {
        Self {
            domain,
            ..Default::default()
        }
    }

    /// Keyword arguments with absent options omitted
    pub(crate) fn kwargs(&self, include_fields: bool) -> Record {
        let mut kwargs = Record::new();
        if include_fields {
            if let Some(fields) = &self.fields {
                kwargs.insert("fields".to_string(), FieldValue::from(fields.clone()));
            }
        }
        if let Some(limit) = self.limit {
            kwargs.insert("limit".to_string(), FieldValue::Int(i64::from(limit)));
        }
        if let Some(offset) = self.offset {
            kwargs.insert("offset".to_string(), FieldValue::Int(i64::from(offset)));
        }
        if let Some(order) = &self.order {
            kwargs.insert("order".to_string(), FieldValue::String(order.clone()));
        }
        kwargs
    }
}

/// Upstream object methods the gateway calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMethod {
    Search,
    Read,
    SearchRead,
    SearchCount,
    Create,
    Write,
    Unlink,
    FieldsGet,
}

impl UpstreamMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamMethod::Search => "search",
            UpstreamMethod::Read => "read",
            UpstreamMethod::SearchRead => "search_read",
            UpstreamMethod::SearchCount => "search_count",
            UpstreamMethod::Create => "create",
            UpstreamMethod::Write => "write",
            UpstreamMethod::Unlink => "unlink",
            UpstreamMethod::FieldsGet => "fields_get",
        }
    }

    /// Read-class methods have no side effects and may be retried
    pub fn is_read(&self) -> bool {
        !matches!(
            self,
            UpstreamMethod::Create | UpstreamMethod::Write | UpstreamMethod::Unlink
        )
    }
}

/// A fully shaped object-method call
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
    pub model: String,
    pub method: UpstreamMethod,
    pub args: Vec<FieldValue>,
    pub kwargs: Record,
}

impl RpcCall {
    pub fn new(model: impl Into<String>, method: UpstreamMethod, args: Vec<FieldValue>) -> Self {
        Self {
            model: model.into(),
            method,
            args,
            kwargs: Record::new(),
        }
    }

    pub fn with_kwargs(mut self, kwargs: Record) -> Self {
        self.kwargs = kwargs;
        self
    }
}

/// Result of a successful authentication
#[derive(Clone, PartialEq)]
pub struct AuthOutcome {
    /// Authenticated principal id
    pub uid: i64,
    /// Bearer credential, only issued by the modern protocol
    pub bearer: Option<String>,
}

impl fmt::Debug for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOutcome")
            .field("uid", &self.uid)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Catalog entry describing one upstream model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model: String,
    pub name: String,
}

impl ModelInfo {
    pub fn new(model: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            name: name.into(),
        }
    }
}

/// Catalog returned when the upstream cannot be enumerated
pub const FALLBACK_MODELS: &[(&str, &str)] = &[
    ("res.partner", "Partner"),
    ("res.users", "User"),
    ("sale.order", "Sale Order"),
    ("purchase.order", "Purchase Order"),
    ("account.move", "Invoice"),
    ("stock.picking", "Stock Picking"),
    ("project.project", "Project"),
    ("crm.lead", "Lead"),
];

pub fn fallback_models() -> Vec<ModelInfo> {
    FALLBACK_MODELS
        .iter()
        .map(|(model, name)| ModelInfo::new(*model, *name))
        .collect()
}
