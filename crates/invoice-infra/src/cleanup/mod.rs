//! Background purge of expired transaction records.
//!
//! Expired records are already invisible to lookups; this only reclaims rows.
//! Raw objects in the upload bucket are never touched.

use std::sync::Arc;
use std::time::Duration;

use invoice_db::InvoiceTransactionRepositoryTrait;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Background service that periodically deletes expired transactions
#[derive(Clone)]
pub struct TransactionCleanupService {
    shutdown_tx: mpsc::Sender<()>,
}

impl TransactionCleanupService {
    /// Spawn the purge loop. Returns `None` when `interval_secs` is 0.
    pub fn start(
        repository: Arc<dyn InvoiceTransactionRepositoryTrait>,
        interval_secs: u64,
    ) -> Option<Self> {
        if interval_secs == 0 {
            tracing::info!("Transaction cleanup disabled");
            return None;
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            Self::worker_loop(repository, interval_secs, shutdown_rx).await;
        });

        Some(Self { shutdown_tx })
    }

    async fn worker_loop(
        repository: Arc<dyn InvoiceTransactionRepositoryTrait>,
        interval_secs: u64,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut tick = interval(Duration::from_secs(interval_secs));

        tracing::info!(interval_secs, "Transaction cleanup service started");

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    Self::run_once(repository.as_ref()).await;
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Transaction cleanup service shutting down");
                    break;
                }
            }
        }
    }

    /// Purge once, logging the outcome. Returns the number of removed records.
    pub async fn run_once(repository: &dyn InvoiceTransactionRepositoryTrait) -> u64 {
        let start = std::time::Instant::now();
        match repository.purge_expired().await {
            Ok(0) => 0,
            Ok(purged) => {
                tracing::info!(
                    purged,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Purged expired transactions"
                );
                purged
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to purge expired transactions");
                0
            }
        }
    }

    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
