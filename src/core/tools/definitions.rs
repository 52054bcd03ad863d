//! Tool catalog and JSON input schemas

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const SEARCH_RECORDS: &str = "odoo_search_records";
pub const CREATE_RECORD: &str = "odoo_create_record";
pub const UPDATE_RECORD: &str = "odoo_update_record";
pub const DELETE_RECORD: &str = "odoo_delete_record";
pub const GET_MODEL_FIELDS: &str = "odoo_get_model_fields";
pub const LIST_MODELS: &str = "odoo_list_models";

/// Tool definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: ToolInputSchema,
}

impl Tool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: ToolInputSchema::object(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_schema(mut self, schema: ToolInputSchema) -> Self {
        self.input_schema = schema;
        self
    }

    /// Function-calling form used by chat-completion style clients
    pub fn to_function(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.input_schema,
            }
        })
    }
}

/// Object schema for tool arguments (a JSON Schema subset)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
}

impl ToolInputSchema {
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
            additional_properties: Some(false),
        }
    }

    pub fn with_property(mut self, name: &str, schema: PropertySchema, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required {
            self.required.push(name.to_string());
        }
        self
    }
}

/// Schema of one argument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertySchema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u32>,
}

impl PropertySchema {
    fn typed(property_type: &str) -> Self {
        Self {
            property_type: Some(property_type.to_string()),
            description: None,
            items: None,
            minimum: None,
            maximum: None,
            min_items: None,
        }
    }

    pub fn string() -> Self {
        Self::typed("string")
    }

    pub fn integer() -> Self {
        Self::typed("integer")
    }

    pub fn object() -> Self {
        Self::typed("object")
    }

    /// Any JSON value
    pub fn any() -> Self {
        Self {
            property_type: None,
            ..Self::typed("")
        }
    }

    pub fn array(items: PropertySchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array")
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.minimum = min;
        self.maximum = max;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.min_items = Some(1);
        self
    }
}

fn model_property() -> PropertySchema {
    PropertySchema::string().with_description("Technical model name, e.g. res.partner")
}

fn ids_property() -> PropertySchema {
    PropertySchema::array(PropertySchema::integer().with_range(Some(1), None))
        .non_empty()
        .with_description("Record ids")
}

/// The six tools offered to tool callers
pub fn catalog() -> Vec<Tool> {
    vec![
        Tool::new(SEARCH_RECORDS)
            .with_description("Search records of a model and return the requested fields")
            .with_schema(
                ToolInputSchema::object()
                    .with_property("model", model_property(), true)
                    .with_property(
                        "domain",
                        PropertySchema::array(PropertySchema::any()).with_description(
                            "Filter as [field, operator, value] triples, optionally with the prefix connectives '&', '|' and '!'",
                        ),
                        false,
                    )
                    .with_property(
                        "fields",
                        PropertySchema::array(PropertySchema::string())
                            .with_description("Fields to return; all fields when omitted"),
                        false,
                    )
                    .with_property(
                        "limit",
                        PropertySchema::integer()
                            .with_range(Some(1), Some(1000))
                            .with_description("Maximum number of records"),
                        false,
                    )
                    .with_property(
                        "offset",
                        PropertySchema::integer()
                            .with_range(Some(0), None)
                            .with_description("Number of records to skip"),
                        false,
                    )
                    .with_property(
                        "order",
                        PropertySchema::string().with_description("Sort order, e.g. 'name asc'"),
                        false,
                    ),
            ),
        Tool::new(CREATE_RECORD)
            .with_description("Create a record and return its id")
            .with_schema(
                ToolInputSchema::object()
                    .with_property("model", model_property(), true)
                    .with_property(
                        "values",
                        PropertySchema::object().with_description("Field values of the new record"),
                        true,
                    ),
            ),
        Tool::new(UPDATE_RECORD)
            .with_description("Update one or more records")
            .with_schema(
                ToolInputSchema::object()
                    .with_property("model", model_property(), true)
                    .with_property("ids", ids_property(), true)
                    .with_property(
                        "values",
                        PropertySchema::object().with_description("Field values to write"),
                        true,
                    ),
            ),
        Tool::new(DELETE_RECORD)
            .with_description("Delete one or more records")
            .with_schema(
                ToolInputSchema::object()
                    .with_property("model", model_property(), true)
                    .with_property("ids", ids_property(), true),
            ),
        Tool::new(GET_MODEL_FIELDS)
            .with_description("Describe the fields of a model")
            .with_schema(ToolInputSchema::object().with_property("model", model_property(), true)),
        Tool::new(LIST_MODELS)
            .with_description("List the models available on the server")
            .with_schema(ToolInputSchema::object()),
    ]
}

pub fn find(name: &str) -> Option<Tool> {
    catalog().into_iter().find(|tool| tool.name == name)
}
