//! Invoice Core Library
//!
//! Domain models, the transaction state machine, error types and configuration
//! shared by every crate of the invoice import service.

pub mod config;
pub mod error;
pub mod models;
pub mod state_machine;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel, PipelineError};
pub use state_machine::{decide, Decision, TransactionEvent};
pub use storage_types::StorageBackend;
