//! Trigger handlers of the import pipeline and the HTTP/WebSocket routes feeding them.
//!
//! The three pipeline handlers (URL issuance, import processing, cancellation) resolve
//! every failure locally: they log it, tell the client what they can over the push
//! channel, and return an outcome instead of an error.

pub mod cancel_import;
pub mod health;
pub mod import_processor;
pub mod import_url;
pub mod local_upload;
pub mod storage_events;
pub mod ws;

use crate::state::AppState;
use invoice_core::models::InvoiceTransactionStatus;
use invoice_core::{LogLevel, PipelineError};
use invoice_infra::{notify_status, DeliveryOutcome};

pub use cancel_import::{cancel_import, CancelOutcome};
pub use import_processor::{process_object_created, process_storage_event, ImportOutcome};
pub use import_url::{issue_import_url, IssuedImport};

pub(crate) async fn push_status(
    state: &AppState,
    connection_id: &str,
    transaction_id: &str,
    status: InvoiceTransactionStatus,
) -> DeliveryOutcome {
    notify_status(state.notifier.as_ref(), connection_id, transaction_id, status).await
}

/// Status of the live record after a conditional update was lost. `NotFound` if it is gone.
pub(crate) async fn current_status(
    state: &AppState,
    transaction_id: &str,
) -> Result<InvoiceTransactionStatus, PipelineError> {
    let record = state.transactions.get(transaction_id).await?;
    Ok(record
        .map(|r| r.status)
        .unwrap_or(InvoiceTransactionStatus::NotFound))
}

pub(crate) fn log_pipeline_error(error: &PipelineError, transaction_id: &str, stage: &str) {
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(transaction_id = %transaction_id, stage, error = %error, "Pipeline stopped")
        }
        LogLevel::Warn => {
            tracing::warn!(transaction_id = %transaction_id, stage, error = %error, "Pipeline stopped")
        }
        LogLevel::Error => {
            tracing::error!(transaction_id = %transaction_id, stage, error = %error, "Pipeline failed")
        }
    }
}
