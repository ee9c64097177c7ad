//! Application setup and initialization
//!
//! Everything `main` needs before it can serve: configuration checks, telemetry,
//! the database pool, object storage, application state and routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use invoice_core::Config;
use invoice_db::{
    InvoiceRepository, InvoiceRepositoryTrait, InvoiceTransactionRepository,
    InvoiceTransactionRepositoryTrait,
};
use invoice_infra::TransactionCleanupService;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Telemetry first so configuration warnings are not dropped
    invoice_infra::init_telemetry(&config.environment, config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let warnings = validation::validate_config(&config).context("Configuration validation failed")?;
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        warnings = warnings.len(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let transactions: Arc<dyn InvoiceTransactionRepositoryTrait> =
        Arc::new(InvoiceTransactionRepository::new(pool.clone()));
    let invoices: Arc<dyn InvoiceRepositoryTrait> = Arc::new(InvoiceRepository::new(pool));

    let cleanup_service =
        TransactionCleanupService::start(transactions.clone(), config.cleanup_interval_secs);

    let node_endpoint = node_endpoint(config.server_port);
    tracing::info!(node_endpoint = %node_endpoint, "Node endpoint resolved");

    let state = Arc::new(
        AppState::new(config.clone(), transactions, invoices, storage, node_endpoint)
            .with_cleanup_service(cleanup_service),
    );

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}

/// `host:port` of this node, stored on each transaction next to its connection id.
fn node_endpoint(port: u16) -> String {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string());
    format!("{}:{}", host, port)
}
