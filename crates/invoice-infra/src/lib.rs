//! Invoice Infrastructure Library
//!
//! Shared infrastructure for the invoice import service:
//! - Telemetry initialization
//! - Push Notifier and the in-process connection hub
//! - Request ID middleware
//! - Expired transaction cleanup
//! - HTTP error body

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

pub mod push;

#[cfg(feature = "cleanup")]
pub mod cleanup;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

pub use error::ErrorResponse;

pub use push::{notify_status, ConnectionHub, DeliveryOutcome, PushNotifier};

#[cfg(feature = "test-util")]
pub use push::RecordingNotifier;

#[cfg(feature = "cleanup")]
pub use cleanup::TransactionCleanupService;
