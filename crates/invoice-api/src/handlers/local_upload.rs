use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use invoice_core::models::ObjectCreated;
use invoice_core::{AppError, StorageBackend};

use super::process_object_created;
use crate::constants::INVOICE_CONTENT_TYPE;
use crate::error::HttpAppError;
use crate::state::AppState;

/// Write target issued by the local storage backend.
///
/// Stores the body under the transaction id, answers, then raises the object-created
/// trigger in the background the way an S3 notification would.
#[tracing::instrument(skip(state, body), fields(body_bytes = body.len()))]
pub async fn put_local_upload(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, HttpAppError> {
    if state.storage.backend_type() != StorageBackend::Local {
        return Err(AppError::NotFound("Local uploads are not enabled".to_string()).into());
    }

    let max = state.config.max_invoice_file_bytes;
    if body.len() > max {
        return Err(AppError::PayloadTooLarge(format!(
            "{} bytes exceeds max {} bytes",
            body.len(),
            max
        ))
        .into());
    }

    // Only live transactions accept uploads, mirroring an expired presigned URL.
    if state.transactions.get(&transaction_id).await?.is_none() {
        return Err(
            AppError::NotFound(format!("Transaction {} not found", transaction_id)).into(),
        );
    }

    state
        .storage
        .put(&transaction_id, body.to_vec(), INVOICE_CONTENT_TYPE)
        .await?;

    let trigger = ObjectCreated {
        bucket: state.storage.bucket().to_string(),
        key: transaction_id,
        size: Some(body.len() as u64),
    };
    let state = state.clone();
    tokio::spawn(async move {
        process_object_created(&state, &trigger).await;
    });

    Ok(StatusCode::OK)
}
