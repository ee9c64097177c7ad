//! Data models for the invoice import pipeline
//!
//! Transactions track one upload attempt each, invoices are the committed documents,
//! and the push and storage-event modules describe the wire shapes exchanged with
//! clients and with the object store.

mod invoice;
mod push;
mod storage_event;
mod transaction;

pub use invoice::*;
pub use push::*;
pub use storage_event::*;
pub use transaction::*;
