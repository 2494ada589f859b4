//! Vetric HTTP tool
//!
//! The generic schema-driven tool: exposes every catalog operation to the
//! model under one tool name, with the operation set enumerated in the
//! argument schema and in the usage instruction.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::dispatch::Dispatcher;
use super::{Tool, ToolMetadata, ToolParameter};
use crate::catalog::{Catalog, PathConvention};
use crate::schema;

pub const TOOL_NAME: &str = "vetric_http";

pub struct VetricHttpTool {
    catalog: Catalog,
    dispatcher: Dispatcher,
}

impl VetricHttpTool {
    /// Parse the embedded schema and build a fresh catalog.
    ///
    /// The catalog is rebuilt on every construction (one per request), not
    /// cached. The schema is small and static, so the parse cost buys
    /// freedom from staleness concerns.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let document = schema::vetric_schema()?;
        let catalog = Catalog::build(&document, &PathConvention::vetric())
            .context("failed to build Vetric operation catalog")?;

        Ok(Self {
            catalog,
            dispatcher: Dispatcher::new(api_key),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[async_trait]
impl Tool for VetricHttpTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: TOOL_NAME.to_string(),
            description: "Make Vetric API calls to fetch or post data".to_string(),
            parameters: vec![
                ToolParameter {
                    name: "operation".to_string(),
                    param_type: "string".to_string(),
                    description: "The operation to invoke".to_string(),
                    required: true,
                    enum_values: Some(self.catalog.names()),
                    items_type: None,
                },
                ToolParameter {
                    name: "query".to_string(),
                    param_type: "string".to_string(),
                    description: "The search query to send".to_string(),
                    required: true,
                    enum_values: None,
                    items_type: None,
                },
            ],
        }
    }

    fn instruction(&self) -> String {
        let mut lines =
            vec!["To interact with the Vetric API, you can use the following operations:".to_string()];
        for name in self.catalog.names() {
            lines.push(format!("- {name}"));
        }
        lines.push(String::new());
        lines.push(
            "Each operation requires a query parameter. The operation name indicates whether \
             it's a GET (fetch*) or POST (post*) request."
                .to_string(),
        );
        lines.join("\n")
    }

    fn validate(&self, args: &Value) -> Result<()> {
        let operation = args["operation"]
            .as_str()
            .ok_or_else(|| anyhow!("'operation' parameter is required and must be a string"))?;

        if self.catalog.get(operation).is_none() {
            return Err(anyhow!("Unknown operation '{operation}'"));
        }

        args["query"]
            .as_str()
            .ok_or_else(|| anyhow!("'query' parameter is required and must be a string"))?;

        Ok(())
    }

    async fn invoke(&self, args: Value) -> Result<Value> {
        self.validate(&args)?;

        let operation = args["operation"].as_str().unwrap();
        let query = args["query"].as_str().unwrap();

        let result = self.dispatcher.dispatch(&self.catalog, operation, query).await;
        Ok(serde_json::to_value(result)?)
    }
}
