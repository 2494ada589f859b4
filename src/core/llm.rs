//! Gateway LLM client
//!
//! OpenAI-format chat completions issued through the Skyfire metered proxy.
//! The caller's credential rides on every request in the gateway header; the
//! gateway bills it and forwards upstream. Responses are always streamed:
//! text deltas are forwarded token-by-token, tool-call deltas are accumulated
//! and returned whole at stream end.

use anyhow::{anyhow, Result};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::GATEWAY_API_KEY_HEADER;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain("assistant", content)
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Assistant turn that requested tool calls.
    pub fn assistant_with_tools(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    /// Serialized tool result answering one tool call.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it.
    pub arguments: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    index: usize,
    id: Option<String>,
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Result of one streamed completion.
#[derive(Debug)]
pub struct StepOutcome {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

pub struct GatewayClient {
    client: Client,
    endpoint_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GatewayClient {
    pub fn new(settings: &Settings, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint_url: settings.gateway.endpoint_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: settings.llm.model.clone(),
            max_tokens: settings.llm.max_tokens,
            temperature: settings.llm.temperature,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/proxy/openai/v1/chat/completions", self.endpoint_url)
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/proxy/openai/v1/audio/transcriptions", self.endpoint_url)
    }

    /// Stream one completion. Text deltas are sent over `tx` as they arrive;
    /// tool-call fragments are stitched together and returned at stream end.
    pub async fn stream_step(
        &self,
        messages: &[ChatMessage],
        tools: Vec<Value>,
        tx: &mpsc::Sender<String>,
    ) -> Result<StepOutcome> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: true,
            tools,
        };

        let response = self
            .client
            .post(self.completions_url())
            .header(GATEWAY_API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("API error {status}: {error_text}"));
        }

        let mut stream = response.bytes_stream();
        let mut line_buffer = String::new();
        let mut content = String::new();
        let mut partial: Vec<PartialToolCall> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            line_buffer.push_str(&String::from_utf8_lossy(&bytes));

            // Chunk boundaries don't align with SSE lines; only complete
            // lines leave the buffer.
            while let Some(pos) = line_buffer.find('\n') {
                let line: String = line_buffer.drain(..=pos).collect();
                let line = line.trim_end();

                let Some(payload) = line.strip_prefix("data: ") else {
                    continue;
                };
                if payload == "[DONE]" {
                    continue;
                }
                let Ok(chunk) = serde_json::from_str::<StreamChunk>(payload) else {
                    continue;
                };
                let Some(choice) = chunk.choices.into_iter().next() else {
                    continue;
                };

                if let Some(text) = choice.delta.content {
                    if !text.is_empty() {
                        content.push_str(&text);
                        tx.send(text).await?;
                    }
                }

                for delta in choice.delta.tool_calls.unwrap_or_default() {
                    while partial.len() <= delta.index {
                        partial.push(PartialToolCall::default());
                    }
                    let slot = &mut partial[delta.index];
                    if let Some(id) = delta.id {
                        slot.id = id;
                    }
                    if let Some(function) = delta.function {
                        if let Some(name) = function.name {
                            slot.name.push_str(&name);
                        }
                        if let Some(arguments) = function.arguments {
                            slot.arguments.push_str(&arguments);
                        }
                    }
                }
            }
        }

        let tool_calls = partial
            .into_iter()
            .filter(|call| !call.name.is_empty())
            .map(|call| ToolCall {
                id: call.id,
                kind: "function".to_string(),
                function: FunctionCall {
                    name: call.name,
                    arguments: call.arguments,
                },
            })
            .collect();

        Ok(StepOutcome {
            content,
            tool_calls,
        })
    }

    /// Proxy an audio blob to the Whisper transcription endpoint.
    pub async fn transcribe(&self, audio: Vec<u8>, mime_type: &str) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.webm")
            .mime_str(mime_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", "whisper-1")
            .text("language", "en")
            .text("response_format", "text");

        let response = self
            .client
            .post(self.transcriptions_url())
            .header(GATEWAY_API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Transcription error {status}: {error_text}"));
        }

        Ok(response.text().await?)
    }
}
