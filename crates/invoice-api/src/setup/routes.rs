//! Route configuration and setup

use crate::constants::{HEALTH_ROUTE, LOCAL_UPLOAD_ROUTE, STORAGE_EVENTS_ROUTE, WS_ROUTE};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use invoice_core::{Config, StorageBackend};
use invoice_infra::request_id_middleware;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Upper bound for a storage event body (many records per delivery).
const MAX_STORAGE_EVENT_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let mut router = Router::new()
        .route(HEALTH_ROUTE, get(handlers::health::health))
        .route(WS_ROUTE, get(handlers::ws::ws_upgrade))
        .route(
            STORAGE_EVENTS_ROUTE,
            post(handlers::storage_events::receive_storage_event)
                .layer(RequestBodyLimitLayer::new(MAX_STORAGE_EVENT_BYTES)),
        );

    if config.storage_backend == StorageBackend::Local {
        tracing::info!(route = LOCAL_UPLOAD_ROUTE, "Local upload target enabled");
        router = router.route(
            LOCAL_UPLOAD_ROUTE,
            put(handlers::local_upload::put_local_upload)
                .layer::<_, std::convert::Infallible>(RequestBodyLimitLayer::new(
                    config.max_invoice_file_bytes,
                ))
                .layer(DefaultBodyLimit::disable()),
        );
    }

    let app = router
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}
