use invoice_core::models::{InvoiceTransactionStatus, PushMessage};
use invoice_core::{LogLevel, PipelineError};

/// Result of a single best-effort delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The endpoint is no longer connected.
    ChannelClosed,
    Error(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

/// Delivers push messages to a connected client endpoint.
///
/// Delivery is at-most-once: no retry, no buffering for absent endpoints.
#[async_trait::async_trait]
pub trait PushNotifier: Send + Sync {
    async fn send(&self, connection_id: &str, message: &PushMessage) -> DeliveryOutcome;
}

/// Push a status update and log the outcome. Delivery failure never fails the caller.
pub async fn notify_status(
    notifier: &dyn PushNotifier,
    connection_id: &str,
    transaction_id: &str,
    status: InvoiceTransactionStatus,
) -> DeliveryOutcome {
    let message = PushMessage::status(transaction_id, status);
    let outcome = notifier.send(connection_id, &message).await;

    match &outcome {
        DeliveryOutcome::Delivered => tracing::debug!(
            connection_id = %connection_id,
            transaction_id = %transaction_id,
            status = %status,
            "Status pushed"
        ),
        DeliveryOutcome::ChannelClosed => {
            let error = PipelineError::ChannelClosed(connection_id.to_string());
            match error.log_level() {
                LogLevel::Debug => tracing::debug!(
                    transaction_id = %transaction_id,
                    status = %status,
                    error = %error,
                    "Status not delivered"
                ),
                LogLevel::Warn => tracing::warn!(
                    transaction_id = %transaction_id,
                    status = %status,
                    error = %error,
                    "Status not delivered"
                ),
                LogLevel::Error => tracing::error!(
                    transaction_id = %transaction_id,
                    status = %status,
                    error = %error,
                    "Status not delivered"
                ),
            }
        }
        DeliveryOutcome::Error(error) => tracing::error!(
            connection_id = %connection_id,
            transaction_id = %transaction_id,
            status = %status,
            error = %error,
            "Status push failed"
        ),
    }

    outcome
}
