//! Database repositories for data access layer
//!
//! Each repository is defined as an async trait with a PostgreSQL implementation
//! and an in-memory one used by tests.
//
// Transaction Store
pub mod invoice_transaction;
//
// Document Store
pub mod invoice;
//
// In-memory implementations
pub mod memory;

pub use invoice::{InvoiceRepository, InvoiceRepositoryTrait};
pub use invoice_transaction::{InvoiceTransactionRepository, InvoiceTransactionRepositoryTrait};
pub use memory::{InMemoryInvoiceRepository, InMemoryInvoiceTransactionRepository};
