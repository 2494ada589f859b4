//! Image display tool
//!
//! No network: the payload is handed straight back for the client to render
//! in the media pane.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolMetadata, ToolParameter};

pub const TOOL_NAME: &str = "show_images";

pub struct ShowImagesTool;

impl ShowImagesTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShowImagesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ShowImagesTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: TOOL_NAME.to_string(),
            description: "Display a set of image URLs to the user".to_string(),
            parameters: vec![ToolParameter {
                name: "urls".to_string(),
                param_type: "array".to_string(),
                description: "Image URLs to display".to_string(),
                required: true,
                enum_values: None,
                items_type: Some("string".to_string()),
            }],
        }
    }

    fn instruction(&self) -> String {
        "When your answer includes images the user should see, call show_images with the list \
         of image URLs instead of pasting raw URLs into your reply."
            .to_string()
    }

    fn validate(&self, args: &Value) -> Result<()> {
        let urls = args["urls"]
            .as_array()
            .ok_or_else(|| anyhow!("'urls' parameter is required and must be an array"))?;

        if urls.is_empty() {
            return Err(anyhow!("'urls' must contain at least one URL"));
        }
        if !urls.iter().all(|url| url.is_string()) {
            return Err(anyhow!("every entry in 'urls' must be a string"));
        }

        Ok(())
    }

    async fn invoke(&self, args: Value) -> Result<Value> {
        self.validate(&args)?;
        tracing::info!(
            count = args["urls"].as_array().map(Vec::len).unwrap_or(0),
            "showing images"
        );
        Ok(json!({
            "success": true,
            "urls": args["urls"],
        }))
    }
}
