//! Cancellation Handler

use invoice_core::models::InvoiceTransactionStatus;
use invoice_core::{decide, Decision, PipelineError, TransactionEvent};

use super::{current_status, log_pipeline_error, push_status};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NotFound,
    /// Not cancellable any more; the current status was pushed instead.
    Rejected(InvoiceTransactionStatus),
    Aborted(String),
}

/// Cancel a `GENERATED` transaction on behalf of the requesting connection.
///
/// Replies go to `connection_id` (the requester), not to the connection stored on
/// the record. The stored status is changed through a conditional update before
/// `CANCELLED` is pushed, so a client is never told `CANCELLED` for an import that won.
#[tracing::instrument(skip(state))]
pub async fn cancel_import(
    state: &AppState,
    connection_id: &str,
    transaction_id: &str,
) -> CancelOutcome {
    match run(state, connection_id, transaction_id).await {
        Ok(outcome) => {
            tracing::info!(outcome = ?outcome, "Cancel request handled");
            outcome
        }
        Err(e) => {
            log_pipeline_error(&e, transaction_id, "cancel_import");
            CancelOutcome::Aborted(e.to_string())
        }
    }
}

async fn run(
    state: &AppState,
    connection_id: &str,
    transaction_id: &str,
) -> Result<CancelOutcome, PipelineError> {
    let current = state
        .transactions
        .get(transaction_id)
        .await?
        .map(|record| record.status);

    match decide(current, TransactionEvent::CancelRequested) {
        Decision::NotFound => {
            tracing::debug!("Cancel requested for unknown or expired transaction");
            push_status(
                state,
                connection_id,
                transaction_id,
                InvoiceTransactionStatus::NotFound,
            )
            .await;
            Ok(CancelOutcome::NotFound)
        }
        Decision::Reject { current } => {
            tracing::warn!(
                status = %current,
                "Cancellation rejected, transaction is no longer cancellable"
            );
            push_status(state, connection_id, transaction_id, current).await;
            Ok(CancelOutcome::Rejected(current))
        }
        Decision::Advance { from, to } => {
            if state
                .transactions
                .update_status_if(transaction_id, from, to)
                .await?
            {
                push_status(state, connection_id, transaction_id, to).await;
                return Ok(CancelOutcome::Cancelled);
            }

            let actual = current_status(state, transaction_id).await?;
            tracing::warn!(
                error = %PipelineError::InvalidTransition { expected: from, actual },
                "Lost conditional update, cancellation rejected"
            );
            push_status(state, connection_id, transaction_id, actual).await;

            if actual == InvoiceTransactionStatus::NotFound {
                Ok(CancelOutcome::NotFound)
            } else {
                Ok(CancelOutcome::Rejected(actual))
            }
        }
    }
}
