//! Configuration module
//!
//! Settings are read from the environment (after loading `.env` through `dotenvy`).
//! Only `DATABASE_URL` is mandatory; backend-specific storage settings are checked
//! by [`Config::validate`].

use std::env;
use std::str::FromStr;

use chrono::Duration;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const IMPORT_URL_EXPIRY_SECS: i64 = 300;
const TRANSACTION_TTL_SECS: i64 = 300;
const INVOICE_TTL_SECS: i64 = 0;
const CLEANUP_INTERVAL_SECS: u64 = 60;
const WS_MAX_MESSAGE_BYTES: usize = 64 * 1024;
const MAX_INVOICE_FILE_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Pipeline configuration
    pub import_url_expiry_secs: i64,
    pub transaction_ttl_secs: i64,
    /// 0 = invoices never expire.
    pub invoice_ttl_secs: i64,
    /// 0 = cleanup disabled.
    pub cleanup_interval_secs: u64,
    pub ws_max_message_bytes: usize,
    pub max_invoice_file_bytes: usize,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::S3,
        };

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            import_url_expiry_secs: env_or("IMPORT_URL_EXPIRY_SECS", IMPORT_URL_EXPIRY_SECS),
            transaction_ttl_secs: env_or("TRANSACTION_TTL_SECS", TRANSACTION_TTL_SECS),
            invoice_ttl_secs: env_or("INVOICE_TTL_SECS", INVOICE_TTL_SECS),
            cleanup_interval_secs: env_or("CLEANUP_INTERVAL_SECS", CLEANUP_INTERVAL_SECS),
            ws_max_message_bytes: env_or("WS_MAX_MESSAGE_BYTES", WS_MAX_MESSAGE_BYTES),
            max_invoice_file_bytes: env_or("MAX_INVOICE_FILE_BYTES", MAX_INVOICE_FILE_BYTES),
        })
    }

    /// Fail fast on settings that would only surface at the first request.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    anyhow::bail!("S3_BUCKET must be set when STORAGE_BACKEND=s3");
                }
                if self.s3_region().is_none() {
                    anyhow::bail!("S3_REGION or AWS_REGION must be set when STORAGE_BACKEND=s3");
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    anyhow::bail!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set when STORAGE_BACKEND=local"
                    );
                }
            }
        }

        if self.import_url_expiry_secs <= 0 {
            anyhow::bail!("IMPORT_URL_EXPIRY_SECS must be positive");
        }
        if self.transaction_ttl_secs <= 0 {
            anyhow::bail!("TRANSACTION_TTL_SECS must be positive");
        }
        if self.invoice_ttl_secs < 0 {
            anyhow::bail!("INVOICE_TTL_SECS must not be negative");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn import_url_expiry(&self) -> Duration {
        Duration::seconds(self.import_url_expiry_secs)
    }

    pub fn transaction_ttl(&self) -> Duration {
        Duration::seconds(self.transaction_ttl_secs)
    }

    /// `None` when invoices are kept forever.
    pub fn invoice_ttl(&self) -> Option<Duration> {
        (self.invoice_ttl_secs > 0).then(|| Duration::seconds(self.invoice_ttl_secs))
    }

    /// A configuration suitable for tests: local storage, no database URL check.
    pub fn for_local(storage_path: impl Into<String>, base_url: impl Into<String>) -> Self {
        Config {
            server_port: SERVER_PORT,
            environment: "test".to_string(),
            database_url: String::new(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: Some(storage_path.into()),
            local_storage_base_url: Some(base_url.into()),
            import_url_expiry_secs: IMPORT_URL_EXPIRY_SECS,
            transaction_ttl_secs: TRANSACTION_TTL_SECS,
            invoice_ttl_secs: INVOICE_TTL_SECS,
            cleanup_interval_secs: 0,
            ws_max_message_bytes: WS_MAX_MESSAGE_BYTES,
            max_invoice_file_bytes: MAX_INVOICE_FILE_BYTES,
        }
    }
}
