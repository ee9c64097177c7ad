//! In-process connection registry for the push channel.

use dashmap::DashMap;
use invoice_core::models::PushMessage;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use super::notifier::{DeliveryOutcome, PushNotifier};

/// Outbound frames queued per connection before delivery reports an error.
pub const DEFAULT_CONNECTION_BUFFER: usize = 32;

/// Open push-channel endpoints, keyed by connection id.
///
/// Each socket task owns the receiving half; the hub only holds senders.
pub struct ConnectionHub {
    connections: DashMap<String, mpsc::Sender<PushMessage>>,
    buffer: usize,
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTION_BUFFER)
    }
}

impl ConnectionHub {
    pub fn new(buffer: usize) -> Self {
        Self {
            connections: DashMap::new(),
            buffer: buffer.max(1),
        }
    }

    /// Register a new endpoint under a fresh connection id.
    pub fn register(&self) -> (String, mpsc::Receiver<PushMessage>) {
        let connection_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(self.buffer);
        self.connections.insert(connection_id.clone(), tx);

        tracing::debug!(
            connection_id = %connection_id,
            connections = self.connections.len(),
            "Push connection registered"
        );

        (connection_id, rx)
    }

    pub fn unregister(&self, connection_id: &str) -> bool {
        let removed = self.connections.remove(connection_id).is_some();
        if removed {
            tracing::debug!(
                connection_id = %connection_id,
                connections = self.connections.len(),
                "Push connection removed"
            );
        }
        removed
    }

    pub fn is_connected(&self, connection_id: &str) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[async_trait::async_trait]
impl PushNotifier for ConnectionHub {
    async fn send(&self, connection_id: &str, message: &PushMessage) -> DeliveryOutcome {
        // Clone the sender so no map guard is held while sending.
        let Some(sender) = self.connections.get(connection_id).map(|s| s.clone()) else {
            return DeliveryOutcome::ChannelClosed;
        };

        match sender.try_send(message.clone()) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(TrySendError::Closed(_)) => {
                self.connections.remove(connection_id);
                DeliveryOutcome::ChannelClosed
            }
            Err(TrySendError::Full(_)) => {
                DeliveryOutcome::Error("connection buffer full".to_string())
            }
        }
    }
}
