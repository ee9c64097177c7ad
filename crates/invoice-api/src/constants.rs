//! Route paths and fixed protocol values

/// Push-channel WebSocket endpoint
pub const WS_ROUTE: &str = "/ws";

/// Object-created notifications in the S3 event shape
pub const STORAGE_EVENTS_ROUTE: &str = "/internal/storage-events";

/// Upload target served when the local storage backend is active.
/// `LOCAL_STORAGE_BASE_URL` must point at this path prefix.
pub const LOCAL_UPLOAD_PREFIX: &str = "/uploads";
pub const LOCAL_UPLOAD_ROUTE: &str = "/uploads/{transaction_id}";

pub const HEALTH_ROUTE: &str = "/health";

/// Content type the issued write targets are signed for.
pub const INVOICE_CONTENT_TYPE: &str = "application/json";
