//! Axum route handler for the split endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::errors::AppError;
use crate::split::request::SplitRequest;
use crate::split::service::{split_calendar, SplitResponse};
use crate::state::AppState;

/// POST /split-calendar
///
/// Splits one calendar row's `content_items` into one new row per item.
/// Malformed bodies are reported as `ValidationError` like any other bad request.
pub async fn handle_split_calendar(
    State(state): State<AppState>,
    payload: Result<Json<SplitRequest>, JsonRejection>,
) -> Result<Json<SplitResponse>, AppError> {
    let Json(request) = payload?;
    let response = split_calendar(state.store.as_ref(), request).await?;
    Ok(Json(response))
}
