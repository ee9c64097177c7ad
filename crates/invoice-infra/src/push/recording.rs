use std::collections::HashSet;
use std::sync::Mutex;

use invoice_core::models::{InvoiceTransactionStatus, PushMessage};

use super::notifier::{DeliveryOutcome, PushNotifier};

/// Notifier that keeps every message it is asked to deliver.
///
/// Connections marked closed report `ChannelClosed` and record nothing.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, PushMessage)>>,
    closed: Mutex<HashSet<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self, connection_id: &str) {
        if let Ok(mut closed) = self.closed.lock() {
            closed.insert(connection_id.to_string());
        }
    }

    /// Every message delivered to `connection_id`, in order.
    pub fn messages(&self, connection_id: &str) -> Vec<PushMessage> {
        self.sent
            .lock()
            .map(|sent| {
                sent.iter()
                    .filter(|(id, _)| id == connection_id)
                    .map(|(_, message)| message.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Statuses delivered to `connection_id` for one transaction, in order.
    pub fn statuses(&self, connection_id: &str, transaction_id: &str) -> Vec<InvoiceTransactionStatus> {
        self.messages(connection_id)
            .into_iter()
            .filter_map(|message| match message {
                PushMessage::Status(s) if s.transaction_id == transaction_id => Some(s.status),
                _ => None,
            })
            .collect()
    }

    pub fn total(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl PushNotifier for RecordingNotifier {
    async fn send(&self, connection_id: &str, message: &PushMessage) -> DeliveryOutcome {
        let is_closed = self
            .closed
            .lock()
            .map(|closed| closed.contains(connection_id))
            .unwrap_or(false);
        if is_closed {
            return DeliveryOutcome::ChannelClosed;
        }

        match self.sent.lock() {
            Ok(mut sent) => {
                sent.push((connection_id.to_string(), message.clone()));
                DeliveryOutcome::Delivered
            }
            Err(_) => DeliveryOutcome::Error("recording lock poisoned".to_string()),
        }
    }
}
