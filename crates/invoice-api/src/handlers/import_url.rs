//! URL Issuer

use std::time::Duration;

use chrono::Utc;
use invoice_core::models::{ImportUrlMessage, InvoiceTransaction, InvoiceTransactionStatus, PushMessage};
use invoice_core::PipelineError;
use uuid::Uuid;

use super::{log_pipeline_error, push_status};
use crate::constants::INVOICE_CONTENT_TYPE;
use crate::state::AppState;

/// What the issuer handed to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedImport {
    pub transaction_id: String,
    pub url: String,
    pub expires_in: i64,
}

/// Create a `GENERATED` transaction bound to `connection_id`, sign a write target for it
/// and push the target followed by the `GENERATED` status.
///
/// On failure nothing is pushed; the client only sees the absence of an update.
#[tracing::instrument(skip(state), fields(transaction_id))]
pub async fn issue_import_url(
    state: &AppState,
    connection_id: &str,
    request_id: &str,
) -> Result<IssuedImport, PipelineError> {
    let transaction_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("transaction_id", transaction_id.as_str());

    let result = issue(state, &transaction_id, connection_id, request_id).await;
    if let Err(e) = &result {
        log_pipeline_error(e, &transaction_id, "issue_import_url");
    }
    result
}

async fn issue(
    state: &AppState,
    transaction_id: &str,
    connection_id: &str,
    request_id: &str,
) -> Result<IssuedImport, PipelineError> {
    let expires_in = state.config.import_url_expiry_secs;

    let record = InvoiceTransaction::generated(
        transaction_id.to_string(),
        connection_id.to_string(),
        request_id.to_string(),
        expires_in,
        state.node_endpoint.clone(),
        Utc::now(),
        state.config.transaction_ttl(),
    );
    state.transactions.create(&record).await?;

    let url = state
        .storage
        .presigned_put_url(
            transaction_id,
            INVOICE_CONTENT_TYPE,
            Duration::from_secs(expires_in.max(0) as u64),
        )
        .await
        .map_err(|e| PipelineError::UpstreamFailure(e.to_string()))?;

    let message = PushMessage::ImportUrl(ImportUrlMessage {
        url: url.clone(),
        expires: expires_in,
        transaction_id: transaction_id.to_string(),
    });
    let outcome = state.notifier.send(connection_id, &message).await;
    tracing::info!(
        connection_id = %connection_id,
        request_id = %request_id,
        expires_in,
        delivery = ?outcome,
        "Import URL issued"
    );

    push_status(
        state,
        connection_id,
        transaction_id,
        InvoiceTransactionStatus::Generated,
    )
    .await;

    Ok(IssuedImport {
        transaction_id: transaction_id.to_string(),
        url,
        expires_in,
    })
}
