//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use invoice_core::{Config, StorageBackend};

use crate::constants::LOCAL_UPLOAD_PREFIX;

/// Validate critical configuration values
///
/// Runs the backend checks of [`Config::validate`] plus the limits that only
/// matter to the HTTP layer. Settings that work but are probably wrong come back
/// as warnings for the caller to log.
pub fn validate_config(config: &Config) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    config.validate()?;

    if config.db_max_connections == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.max_invoice_file_bytes == 0 {
        return Err(anyhow::anyhow!("Max invoice file size cannot be 0"));
    }

    if config.ws_max_message_bytes == 0 {
        return Err(anyhow::anyhow!("WebSocket max message size cannot be 0"));
    }

    // Issued URLs must land on this server's upload route
    if config.storage_backend == StorageBackend::Local {
        if let Some(base_url) = &config.local_storage_base_url {
            if !base_url.trim_end_matches('/').ends_with(LOCAL_UPLOAD_PREFIX) {
                warnings.push(format!(
                    "LOCAL_STORAGE_BASE_URL ({}) does not end with {} - uploads will not trigger imports",
                    base_url, LOCAL_UPLOAD_PREFIX
                ));
            }
        }
    }

    if config.transaction_ttl_secs < config.import_url_expiry_secs {
        warnings.push(format!(
            "TRANSACTION_TTL_SECS ({}) is shorter than IMPORT_URL_EXPIRY_SECS ({}) - late uploads will be reported as NOT_FOUND",
            config.transaction_ttl_secs, config.import_url_expiry_secs
        ));
    }

    Ok(warnings)
}
