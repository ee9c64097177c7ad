//! Storage key checks shared by all backends.
//!
//! Uploaded objects are stored at the root of the bucket under their transaction id.

use crate::traits::{StorageError, StorageResult};

const MAX_KEY_LEN: usize = 1024;

/// Reject keys that are empty, too long, absolute or contain path traversal.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey(
            "Storage key must be between 1 and 1024 bytes".to_string(),
        ));
    }
    if storage_key.contains("..") || storage_key.starts_with('/') || storage_key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
