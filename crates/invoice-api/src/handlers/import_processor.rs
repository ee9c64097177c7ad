//! Import Processor
//!
//! One run per object-created trigger. Ordering on the success path:
//! `RECEIVED` is stored and pushed, the payload is parsed, the invoice is committed,
//! the raw object is deleted, then `PROCESSED` is stored and pushed. The object is
//! never deleted before the commit succeeded.

use chrono::Utc;
use futures::future::join_all;
use invoice_core::models::{
    Invoice, InvoiceFile, InvoiceTransaction, InvoiceTransactionStatus, ObjectCreated,
    StorageEvent,
};
use invoice_core::{decide, Decision, PipelineError, TransactionEvent};

use super::{current_status, log_pipeline_error, push_status};
use crate::state::AppState;

/// How one trigger was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Processed,
    /// Unknown or expired transaction. Nobody can be notified.
    NotFound,
    /// The record was not `GENERATED`; its status was pushed and nothing was touched.
    Rejected(InvoiceTransactionStatus),
    /// Moved to `FAILED` (fetch, parse or commit failure).
    Failed(String),
    /// Stopped without reaching a terminal status; the record keeps its last status.
    Aborted(String),
    /// Trigger for a bucket this node does not serve.
    Ignored,
}

/// Process every record of a storage event concurrently.
pub async fn process_storage_event(state: &AppState, event: StorageEvent) -> Vec<ImportOutcome> {
    let triggers = event.into_triggers();
    tracing::debug!(records = triggers.len(), "Processing storage event");

    join_all(
        triggers
            .iter()
            .map(|trigger| process_object_created(state, trigger)),
    )
    .await
}

#[tracing::instrument(skip(state, trigger), fields(transaction_id = %trigger.key, bucket = %trigger.bucket))]
pub async fn process_object_created(state: &AppState, trigger: &ObjectCreated) -> ImportOutcome {
    let start = std::time::Instant::now();

    if trigger.bucket != state.storage.bucket() {
        tracing::warn!(
            expected_bucket = %state.storage.bucket(),
            "Ignoring object-created trigger for foreign bucket"
        );
        return ImportOutcome::Ignored;
    }

    let outcome = match run(state, trigger).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log_pipeline_error(&e, &trigger.key, "import");
            ImportOutcome::Aborted(e.to_string())
        }
    };

    tracing::info!(
        outcome = ?outcome,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Object-created trigger handled"
    );
    outcome
}

async fn run(state: &AppState, trigger: &ObjectCreated) -> Result<ImportOutcome, PipelineError> {
    let transaction_id = trigger.key.as_str();
    let record = state.transactions.get(transaction_id).await?;

    let Some(record) = record else {
        // The connection id lives on the record, so a miss has no one to tell.
        tracing::debug!("Transaction not found, no connection to notify");
        return Ok(ImportOutcome::NotFound);
    };
    let connection_id = record.connection_id.as_str();

    match decide(Some(record.status), TransactionEvent::ObjectCreated) {
        Decision::Advance { from, to } => {
            if !state
                .transactions
                .update_status_if(transaction_id, from, to)
                .await?
            {
                return reject_after_lost_race(state, &record, TransactionEvent::ObjectCreated)
                    .await;
            }
            push_status(state, connection_id, transaction_id, to).await;
        }
        Decision::Reject { current } => {
            tracing::warn!(
                connection_id = %connection_id,
                status = %current,
                "Duplicate or late object-created trigger, transaction not GENERATED"
            );
            push_status(state, connection_id, transaction_id, current).await;
            return Ok(ImportOutcome::Rejected(current));
        }
        Decision::NotFound => return Ok(ImportOutcome::NotFound),
    }

    // RECEIVED from here on; fetch, parse and commit failures end in FAILED.
    let invoice = match load_invoice(state, trigger).await {
        Ok(invoice) => invoice,
        Err(e) => return fail(state, &record, e).await,
    };

    if let Err(e) = state.invoices.put(&invoice).await {
        return fail(state, &record, PipelineError::from(e)).await;
    }
    tracing::info!(
        owner_key = %invoice.owner_key,
        sort_key = %invoice.sort_key,
        "Invoice committed"
    );

    // Committed: failures below leave the record at RECEIVED.
    state
        .storage
        .delete(transaction_id)
        .await
        .map_err(|e| PipelineError::UpstreamFailure(format!("failed to delete raw object: {}", e)))?;

    let (from, to) = TransactionEvent::PayloadCommitted.edge();
    if !state
        .transactions
        .update_status_if(transaction_id, from, to)
        .await?
    {
        let actual = current_status(state, transaction_id).await?;
        tracing::warn!(status = %actual, "Transaction changed while processing, PROCESSED not stored");
        return Ok(ImportOutcome::Aborted(format!(
            "transaction left {} before completion",
            actual
        )));
    }
    push_status(state, connection_id, transaction_id, to).await;

    Ok(ImportOutcome::Processed)
}

async fn load_invoice(state: &AppState, trigger: &ObjectCreated) -> Result<Invoice, PipelineError> {
    let transaction_id = trigger.key.as_str();
    let max = state.config.max_invoice_file_bytes;

    // Size is checked before the body is read; the signed target does not bound it.
    let size = match trigger.size {
        Some(size) => size,
        None => state.storage.size(transaction_id).await.map_err(|e| {
            PipelineError::UpstreamFailure(format!("failed to stat object: {}", e))
        })?,
    };
    if size > max as u64 {
        return Err(PipelineError::ParseFailure(format!(
            "object is {} bytes, limit is {}",
            size, max
        )));
    }

    let bytes = state
        .storage
        .get(transaction_id)
        .await
        .map_err(|e| PipelineError::UpstreamFailure(format!("failed to fetch object: {}", e)))?;

    if bytes.len() > max {
        return Err(PipelineError::ParseFailure(format!(
            "object is {} bytes, limit is {}",
            bytes.len(),
            max
        )));
    }

    let file = InvoiceFile::parse(&bytes)?;
    let now = Utc::now();
    let expires_at = state.config.invoice_ttl().map(|ttl| now + ttl);

    Ok(Invoice::from_file(file, transaction_id, now, expires_at))
}

/// `RECEIVED -> FAILED`, pushing `FAILED` when the update lands.
async fn fail(
    state: &AppState,
    record: &InvoiceTransaction,
    error: PipelineError,
) -> Result<ImportOutcome, PipelineError> {
    let transaction_id = record.transaction_id.as_str();
    log_pipeline_error(&error, transaction_id, "import");

    let (from, to) = TransactionEvent::ProcessingFailed.edge();
    if state
        .transactions
        .update_status_if(transaction_id, from, to)
        .await?
    {
        push_status(state, &record.connection_id, transaction_id, to).await;
    } else {
        tracing::warn!("Transaction left RECEIVED before FAILED could be stored");
    }

    Ok(ImportOutcome::Failed(error.to_string()))
}

/// Another handler won the conditional update: push what the record holds now.
async fn reject_after_lost_race(
    state: &AppState,
    record: &InvoiceTransaction,
    event: TransactionEvent,
) -> Result<ImportOutcome, PipelineError> {
    let transaction_id = record.transaction_id.as_str();
    let actual = current_status(state, transaction_id).await?;
    let (expected, _) = event.edge();

    tracing::warn!(
        connection_id = %record.connection_id,
        error = %PipelineError::InvalidTransition { expected, actual },
        "Lost conditional update"
    );
    push_status(state, &record.connection_id, transaction_id, actual).await;

    if actual == InvoiceTransactionStatus::NotFound {
        Ok(ImportOutcome::NotFound)
    } else {
        Ok(ImportOutcome::Rejected(actual))
    }
}
