//! Push Notifier and the connection hub backing it

pub mod hub;
pub mod notifier;
#[cfg(any(test, feature = "test-util"))]
pub mod recording;

pub use hub::ConnectionHub;
pub use notifier::{notify_status, DeliveryOutcome, PushNotifier};
#[cfg(any(test, feature = "test-util"))]
pub use recording::RecordingNotifier;
