//! Tool front-end
//!
//! Six `odoo_*` tools mapped one-to-one onto gateway operations. Results come
//! back as pretty-printed JSON text.

pub mod arguments;
pub mod definitions;


pub use arguments::parse_tool_call;
pub use definitions::{PropertySchema, Tool, ToolInputSchema, catalog};

use crate::core::gateway::{CallerContext, Gateway};
use crate::utils::error::{ErrorResponse, GatewayError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

/// Tool call request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Tool execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Error result carrying the normalized error payload
    pub fn from_error(err: &GatewayError, expose_detail: bool) -> Self {
        let payload = ErrorResponse::from_error(err, expose_detail);
        Self {
            content: vec![ToolContent::Text {
                text: pretty(&json!(payload)),
            }],
            is_error: true,
        }
    }

    /// Concatenated text content
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|ToolContent::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Validate and run one tool call through the gateway
pub async fn call_tool(gateway: &Gateway, ctx: &CallerContext, call: &ToolCall) -> ToolResult {
    let expose_detail = gateway.config().server.dev_mode;

    let operation = match parse_tool_call(&call.name, &call.arguments) {
        Ok(operation) => operation,
        Err(e) => {
            debug!(tool = %call.name, error = %e, "rejected tool arguments");
            return ToolResult::from_error(&e, expose_detail);
        }
    };

    match gateway.execute(ctx, operation).await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => ToolResult::text(pretty(&value)),
            Err(e) => ToolResult::from_error(&GatewayError::from(e), expose_detail),
        },
        Err(e) => ToolResult::from_error(&e, expose_detail),
    }
}
