//! Invoice Storage Library
//!
//! Object storage for uploaded invoice files. Provides the Storage trait and
//! implementations for S3 and the local filesystem.
//!
//! # Storage key format
//!
//! Each uploaded file is stored at the bucket root under its transaction id.
//! Keys must not contain `..` or a leading `/`; both backends share the checks in
//! the `keys` module.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use invoice_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
