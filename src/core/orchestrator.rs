//! Conversation orchestrator
//!
//! Drives one conversation turn: stream a completion, run whatever tool
//! calls the model issued, feed the results back, repeat until the model
//! answers in plain text or the step ceiling is hit. Tool failures are data
//! in the transcript; only a failure to reach the LLM itself aborts a turn.

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::core::llm::{ChatMessage, GatewayClient, ToolCall};
use crate::tools::registry::ToolRegistry;

/// Events emitted while a turn runs, consumed by whichever surface is
/// driving it (SSE response, CLI printer).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    Token { content: String },
    ToolResult { tool: String, payload: Value },
    Done,
    Error { message: String },
}

pub struct Orchestrator {
    client: GatewayClient,
    registry: ToolRegistry,
    max_steps: usize,
}

impl Orchestrator {
    /// Build a fresh registry and client for one request. Registry
    /// construction failures propagate; nothing has been sent to the model
    /// yet at that point.
    pub fn new(settings: &Settings, api_key: &str) -> Result<Self> {
        let registry = ToolRegistry::build(&settings.gateway.endpoint_url, api_key)?;
        Ok(Self {
            client: GatewayClient::new(settings, api_key),
            registry,
            max_steps: settings.agent.max_steps,
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one turn, streaming [`TurnEvent`]s to `tx`.
    pub async fn run_turn(
        &self,
        mut messages: Vec<ChatMessage>,
        tx: mpsc::Sender<TurnEvent>,
    ) -> Result<()> {
        messages.insert(0, ChatMessage::system(self.registry.instructions()));
        let specs = self.registry.specs();

        for step in 0..self.max_steps {
            let (token_tx, mut token_rx) = mpsc::channel::<String>(32);
            let forward = {
                let tx = tx.clone();
                tokio::spawn(async move {
                    while let Some(token) = token_rx.recv().await {
                        if tx.send(TurnEvent::Token { content: token }).await.is_err() {
                            break;
                        }
                    }
                })
            };

            let outcome = self
                .client
                .stream_step(&messages, specs.clone(), &token_tx)
                .await;
            drop(token_tx);
            let _ = forward.await;
            let outcome = outcome?;

            if outcome.tool_calls.is_empty() {
                break;
            }

            tracing::info!(step, calls = outcome.tool_calls.len(), "model issued tool calls");

            let content = (!outcome.content.is_empty()).then_some(outcome.content);
            messages.push(ChatMessage::assistant_with_tools(
                content,
                outcome.tool_calls.clone(),
            ));

            for call in &outcome.tool_calls {
                let payload = self.execute_call(call).await;
                tx.send(TurnEvent::ToolResult {
                    tool: call.function.name.clone(),
                    payload: payload.clone(),
                })
                .await
                .ok();
                messages.push(ChatMessage::tool(
                    call.id.clone(),
                    serde_json::to_string(&payload)?,
                ));
            }
        }

        tx.send(TurnEvent::Done).await.ok();
        Ok(())
    }

    /// Resolve and run one tool call. Every failure mode becomes a payload;
    /// an invalid call must never reach an outbound request.
    async fn execute_call(&self, call: &ToolCall) -> Value {
        let name = &call.function.name;

        let Some(tool) = self.registry.get(name) else {
            return json!({"success": false, "error": format!("Unknown tool: {name}")});
        };

        let args: Value = match serde_json::from_str(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => {
                return json!({"success": false, "error": format!("Malformed tool arguments: {e}")});
            }
        };

        if let Err(e) = tool.validate(&args) {
            tracing::warn!(tool = %name, error = %e, "tool call failed validation");
            return json!({"success": false, "error": e.to_string()});
        }

        match tool.invoke(args).await {
            Ok(payload) => payload,
            Err(e) => json!({"success": false, "error": e.to_string()}),
        }
    }
}
