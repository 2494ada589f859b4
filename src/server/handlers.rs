use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;

use super::error::AppError;
use super::AppState;
use crate::core::llm::{ChatMessage, GatewayClient};
use crate::core::orchestrator::{Orchestrator, TurnEvent};
use crate::GATEWAY_API_KEY_HEADER;

#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

fn require_api_key(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(GATEWAY_API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(AppError::MissingApiKey)
}

/// One conversation turn, streamed back as SSE events.
///
/// The credential header is required before any tool or model work begins;
/// the registry is rebuilt per request. The turn runs under a fixed deadline;
/// on expiry the stream ends with an error event rather than an HTTP fault.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let api_key = require_api_key(&headers)?;

    if request.messages.is_empty() {
        return Err(AppError::BadRequest("messages must not be empty".to_string()));
    }

    let orchestrator = Orchestrator::new(&state.settings, &api_key)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let deadline = Duration::from_secs(state.settings.server.request_timeout_secs);
    let (tx, rx) = mpsc::channel::<TurnEvent>(64);

    tokio::spawn(async move {
        let turn = orchestrator.run_turn(request.messages, tx.clone());
        match tokio::time::timeout(deadline, turn).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tx.send(TurnEvent::Error {
                    message: e.to_string(),
                })
                .await
                .ok();
            }
            Err(_) => {
                tx.send(TurnEvent::Error {
                    message: format!("request deadline of {}s exceeded", deadline.as_secs()),
                })
                .await
                .ok();
            }
        }
    });

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Event::default().json_data(&event), rx))
    });

    Ok(Sse::new(stream))
}

/// Thin proxy to the Whisper transcription endpoint.
pub async fn transcribe_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, AppError> {
    let api_key = require_api_key(&headers)?;

    if body.is_empty() {
        return Err(AppError::BadRequest("empty audio body".to_string()));
    }

    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("audio/webm")
        .to_string();

    let client = GatewayClient::new(&state.settings, &api_key);
    let text = client
        .transcribe(body.to_vec(), &mime_type)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(TranscribeResponse { text }))
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}
