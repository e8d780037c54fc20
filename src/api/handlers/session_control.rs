use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Outcome, QueueMode, SessionControl};
use crate::AppState;

use super::{json_body, ApiResponse};

#[derive(Debug, Deserialize)]
pub struct PushOutcomeRequest {
    #[serde(rename = "final")]
    pub final_outcome: Option<String>,
    pub required: Option<bool>,
    pub mode: Option<String>,
}

/// GET /api/contract-positions/session-control — pending forced outcomes, in application order
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SessionControl>>>, AppError> {
    let queue = state.session_queue.list_active_queue().await?;
    Ok(ApiResponse::ok(queue))
}

/// POST /api/contract-positions/session-control — reset the queue to one outcome, or append one
pub async fn push(
    State(state): State<AppState>,
    body: Result<Json<PushOutcomeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<SessionControl>>>, AppError> {
    let body = json_body(body)?;

    let final_outcome: Outcome = body
        .final_outcome
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| {
            AppError::InvalidArgument("Field 'final' is required and must be 'WIN' or 'LOSS'".into())
        })?;

    let mode = match body.mode.as_deref() {
        None | Some("") => QueueMode::default(),
        Some(raw) => raw
            .parse::<QueueMode>()
            .map_err(|_| AppError::InvalidArgument("Field 'mode' must be 'reset' or 'append'".into()))?,
    };

    let queue = state
        .session_queue
        .push_outcome(final_outcome, mode, body.required.unwrap_or(true))
        .await?;

    Ok(ApiResponse::ok(queue))
}
