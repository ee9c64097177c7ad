use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode};
use invoice_core::models::StorageEvent;

use super::process_storage_event;
use crate::state::AppState;

/// Receive object-created notifications.
///
/// Always answers `200` so the sender does not redeliver a permanently bad object;
/// outcomes are only logged and pushed to clients.
#[tracing::instrument(skip(state, body), fields(body_bytes = body.len()))]
pub async fn receive_storage_event(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    let event: StorageEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed storage event ignored");
            return StatusCode::OK;
        }
    };

    let outcomes = process_storage_event(&state, event).await;
    tracing::debug!(records = outcomes.len(), "Storage event handled");

    StatusCode::OK
}
