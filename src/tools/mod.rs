//! Tool system - capabilities offered to the model for one conversation turn
//!
//! Each tool is an independent type behind the [`Tool`] trait: a name, a
//! usage instruction contributed to the system prompt, a declared argument
//! schema, and an invocation function. Argument validation happens at the
//! orchestration boundary, before a call reaches any outbound request.

pub mod dispatch;
pub mod email;
pub mod images;
pub mod macros;
pub mod registry;
pub mod vetric;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One declared tool argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub param_type: String,
    pub description: String,
    pub required: bool,
    /// Closed set of accepted values, rendered as a JSON-Schema `enum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Element type for `array` parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_type: Option<String>,
}

/// Tool metadata - the model-facing name, description and argument schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolMetadata {
    /// Render the argument schema as the JSON-Schema object the
    /// chat-completions API expects in a tool definition.
    pub fn json_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut spec = serde_json::Map::new();
            spec.insert("type".to_string(), json!(param.param_type));
            spec.insert("description".to_string(), json!(param.description));
            if let Some(values) = &param.enum_values {
                spec.insert("enum".to_string(), json!(values));
            }
            if let Some(items) = &param.items_type {
                spec.insert("items".to_string(), json!({ "type": items }));
            }
            properties.insert(param.name.clone(), Value::Object(spec));

            if param.required {
                required.push(param.name.clone());
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl fmt::Display for ToolMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// Tool trait - all capabilities offered to the model implement this.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get tool metadata (name, description, argument schema)
    fn metadata(&self) -> ToolMetadata;

    /// Usage instruction concatenated into the system prompt. The model only
    /// knows generated operation names through this text.
    fn instruction(&self) -> String;

    /// Validate arguments before invocation. Invalid arguments must be
    /// rejected here; they never reach an outbound request.
    fn validate(&self, _args: &Value) -> Result<()> {
        Ok(())
    }

    /// Invoke the tool. Remote and transport failures are encoded in the
    /// returned payload so the conversation can continue; `Err` is reserved
    /// for arguments that should have failed validation.
    async fn invoke(&self, args: Value) -> Result<Value>;
}
