use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing API Key")]
    MissingApiKey,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("An error occurred during the request: {0}")]
    Internal(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingApiKey => {
                tracing::warn!("request rejected: no gateway credential");
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "bad request");
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "upstream error");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
