use crate::services::{pack_service::PackError, store::StoreError};
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by HTTP handlers.
///
/// The two expected outcomes (no packs, wrong method) answer with plain text;
/// anything else becomes a 500 with a small JSON body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No pack found")]
    NotFound,
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::NotFound => (status, self.to_string()).into_response(),
            Self::MethodNotAllowed => (
                status,
                [(header::ALLOW, HeaderValue::from_static("GET"))],
                self.to_string(),
            )
                .into_response(),
            Self::Internal(message) => {
                tracing::error!("request failed: {}", message);
                let body = Json(json!({
                    "error": message,
                    "status": status.as_u16()
                }));
                (status, body).into_response()
            }
        }
    }
}

impl From<PackError> for AppError {
    fn from(err: PackError) -> Self {
        match err {
            PackError::Empty(_) => AppError::NotFound,
            other => AppError::internal(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}
