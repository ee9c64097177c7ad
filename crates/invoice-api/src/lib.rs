//! Invoice Import API
//!
//! Push-channel endpoint, storage-event receiver and the import pipeline handlers
//! behind them, plus application setup.

pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use handlers::{
    cancel_import, issue_import_url, process_object_created, process_storage_event,
    CancelOutcome, ImportOutcome, IssuedImport,
};
pub use state::AppState;
