//! Dispatcher
//!
//! Translates a validated tool invocation (operation name + query) into an
//! outbound HTTP request against the catalog's base URL, and normalizes the
//! response into a [`ToolResult`]. Every failure is representable as data:
//! this boundary never throws, so the conversation can always continue.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Catalog, HttpMethod, Operation, ParamLocation};
use crate::GATEWAY_API_KEY_HEADER;

/// Structured success/failure envelope returned from a dispatch.
///
/// `result` is present iff `success`; `error` is present iff not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(operation: &str, config: &Operation, query: &str, result: Value) -> Self {
        Self {
            success: true,
            operation: operation.to_string(),
            method: Some(config.method.to_string()),
            service: Some(config.service.clone()),
            endpoint: Some(config.endpoint.clone()),
            query: query.to_string(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(operation: &str, query: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            operation: operation.to_string(),
            method: None,
            service: None,
            endpoint: None,
            query: query.to_string(),
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Stateless request dispatcher. Safe to share across concurrent calls; the
/// catalog it reads is immutable after construction.
pub struct Dispatcher {
    client: Client,
    api_key: String,
}

impl Dispatcher {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Resolve and issue one operation call.
    ///
    /// The tool surface exposes a single free-text `query` argument, so every
    /// required parameter of the operation receives that same value, routed
    /// to the URL or the JSON body by its declared location.
    pub async fn dispatch(&self, catalog: &Catalog, operation: &str, query: &str) -> ToolResult {
        let Some(config) = catalog.get(operation) else {
            return ToolResult::failure(operation, query, format!("Invalid operation: {operation}"));
        };

        let url = catalog.request_url(config);

        let mut query_params: Vec<(String, String)> = Vec::new();
        let mut body = serde_json::Map::new();
        for param in &config.parameters {
            if !param.required {
                continue;
            }
            match param.location {
                ParamLocation::Query => {
                    query_params.push((param.name.clone(), query.to_string()));
                }
                ParamLocation::Body => {
                    body.insert(param.name.clone(), Value::String(query.to_string()));
                }
            }
        }

        tracing::info!(operation, method = %config.method, url = %url, "dispatching operation");

        let mut request = match config.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        }
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(GATEWAY_API_KEY_HEADER, &self.api_key);

        if !query_params.is_empty() {
            request = request.query(&query_params);
        }
        if !body.is_empty() {
            request = request.json(&Value::Object(body));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return ToolResult::failure(operation, query, format!("Request failed: {e}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let message = if detail.is_empty() {
                format!("HTTP error: {status}")
            } else {
                format!("HTTP error {status}: {detail}")
            };
            return ToolResult::failure(operation, query, message);
        }

        match response.json::<Value>().await {
            Ok(payload) => ToolResult::success(operation, config, query, payload),
            Err(e) => ToolResult::failure(operation, query, format!("Response decode error: {e}")),
        }
    }
}
