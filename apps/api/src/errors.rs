use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Which store call an upstream failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Lookup matched {count} rows, expected exactly one")]
    AmbiguousMatch { count: usize },

    #[error("Store {stage} failed: {source}")]
    Upstream { stage: Stage, source: StoreError },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn upstream(stage: Stage) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Upstream { stage, source }
    }

    /// Stable category string returned to callers.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::NotFound(_) => "NotFoundError",
            AppError::AmbiguousMatch { .. } => "AmbiguousMatchError",
            AppError::Upstream { .. } => "UpstreamError",
            AppError::Internal(_) => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::AmbiguousMatch { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let error = match &self {
            AppError::Upstream { stage, source } => {
                tracing::error!("Store {stage} error: {source}");
                json!({
                    "code": code,
                    "message": format!("The table store {stage} failed: {source}"),
                    "stage": stage.as_str(),
                })
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                json!({
                    "code": code,
                    "message": "An internal server error occurred",
                })
            }
            AppError::Validation(msg) | AppError::NotFound(msg) => json!({
                "code": code,
                "message": msg,
            }),
            AppError::AmbiguousMatch { .. } => json!({
                "code": code,
                "message": self.to_string(),
            }),
        };

        let body = Json(json!({
            "success": false,
            "error": error
        }));

        (status, body).into_response()
    }
}
