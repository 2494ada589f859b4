//! Email tools
//!
//! `compose_email` drafts a message for the user to review; it never sends.
//! `send_email` posts a confirmed draft through the gateway's email receiver,
//! with failures encoded as payload data in the same never-throw style as the
//! dispatcher.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{Tool, ToolMetadata};
use crate::{tool_metadata, validate_required_string, GATEWAY_API_KEY_HEADER};

pub const COMPOSE_TOOL_NAME: &str = "compose_email";
pub const SEND_TOOL_NAME: &str = "send_email";

const SEND_EMAIL_PATH: &str = "/v1/receivers/sendgrid/send-email";

pub struct ComposeEmailTool;

impl ComposeEmailTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComposeEmailTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ComposeEmailTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: COMPOSE_TOOL_NAME,
            description: "Draft an email for the user to review before sending",
            parameters: [
                {
                    name: "to",
                    type: "string",
                    description: "Recipient email address",
                    required: true
                },
                {
                    name: "subject",
                    type: "string",
                    description: "Subject line",
                    required: true
                },
                {
                    name: "body",
                    type: "string",
                    description: "Plain-text message body",
                    required: true
                }
            ]
        }
    }

    fn instruction(&self) -> String {
        "Use compose_email to draft an email when the user asks for one. Always show the draft \
         and wait for the user's confirmation before calling send_email."
            .to_string()
    }

    fn validate(&self, args: &Value) -> Result<()> {
        validate_required_string!(args, "to");
        validate_required_string!(args, "subject");
        validate_required_string!(args, "body");
        Ok(())
    }

    async fn invoke(&self, args: Value) -> Result<Value> {
        self.validate(&args)?;
        Ok(json!({
            "success": true,
            "email": {
                "to": args["to"],
                "subject": args["subject"],
                "body": args["body"],
            },
        }))
    }
}

pub struct SendEmailTool {
    client: Client,
    endpoint_url: String,
    api_key: String,
}

impl SendEmailTool {
    pub fn new(endpoint_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint_url: endpoint_url.into(),
            api_key: api_key.into(),
        }
    }

    fn send_url(&self) -> String {
        format!(
            "{}{}",
            self.endpoint_url.trim_end_matches('/'),
            SEND_EMAIL_PATH
        )
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: SEND_TOOL_NAME,
            description: "Send a confirmed email through the gateway",
            parameters: [
                {
                    name: "to",
                    type: "string",
                    description: "Recipient email address",
                    required: true
                },
                {
                    name: "subject",
                    type: "string",
                    description: "Subject line",
                    required: true
                },
                {
                    name: "body",
                    type: "string",
                    description: "Plain-text message body",
                    required: true
                }
            ]
        }
    }

    fn instruction(&self) -> String {
        "Use send_email only after the user has explicitly confirmed a draft from \
         compose_email. It sends the message on the user's behalf."
            .to_string()
    }

    fn validate(&self, args: &Value) -> Result<()> {
        validate_required_string!(args, "to");
        validate_required_string!(args, "subject");
        validate_required_string!(args, "body");
        Ok(())
    }

    async fn invoke(&self, args: Value) -> Result<Value> {
        self.validate(&args)?;

        let to = args["to"].as_str().unwrap();
        let url = self.send_url();
        tracing::info!(to, "sending email through gateway");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(GATEWAY_API_KEY_HEADER, &self.api_key)
            .json(&json!({
                "to": args["to"],
                "subject": args["subject"],
                "body": args["body"],
            }))
            .send()
            .await;

        let payload = match response {
            Ok(response) if response.status().is_success() => json!({
                "success": true,
                "to": args["to"],
                "subject": args["subject"],
            }),
            Ok(response) => {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                json!({
                    "success": false,
                    "to": args["to"],
                    "error": format!("HTTP error {status}: {detail}"),
                })
            }
            Err(e) => json!({
                "success": false,
                "to": args["to"],
                "error": format!("Request failed: {e}"),
            }),
        };

        Ok(payload)
    }
}
