//! Tool Registry
//!
//! Aggregates every tool offered to a conversation turn. Built fresh per
//! request before any model call; a failing tool constructor aborts the
//! build (fail-fast) rather than serving a partial registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use super::email::{ComposeEmailTool, SendEmailTool};
use super::images::ShowImagesTool;
use super::vetric::VetricHttpTool;
use super::{Tool, ToolMetadata};

pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build the full tool set for one turn: image display, email
    /// compose/send, and the schema-driven Vetric HTTP caller.
    pub fn build(endpoint_url: &str, api_key: &str) -> Result<Self> {
        let mut registry = Self {
            tools: BTreeMap::new(),
        };

        registry.register(Arc::new(ShowImagesTool::new()));
        registry.register(Arc::new(ComposeEmailTool::new()));
        registry.register(Arc::new(SendEmailTool::new(endpoint_url, api_key)));
        registry.register(Arc::new(VetricHttpTool::new(api_key)?));

        Ok(registry)
    }

    fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.metadata().name;
        tracing::debug!(tool = %name, "registering tool");
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn list_tools(&self) -> Vec<ToolMetadata> {
        self.tools.values().map(|tool| tool.metadata()).collect()
    }

    /// Every tool's usage instruction, concatenated into one system-prompt
    /// fragment. The model only learns the generated operation names here.
    pub fn instructions(&self) -> String {
        self.tools
            .values()
            .map(|tool| tool.instruction())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Tool definitions in the shape the chat-completions API expects.
    pub fn specs(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                let metadata = tool.metadata();
                json!({
                    "type": "function",
                    "function": {
                        "name": metadata.name,
                        "description": metadata.description,
                        "parameters": metadata.json_schema(),
                    },
                })
            })
            .collect()
    }
}
