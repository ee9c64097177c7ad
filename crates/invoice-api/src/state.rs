//! Application state shared by the HTTP routes and the push-channel handlers.

use invoice_core::Config;
use invoice_db::{InvoiceRepositoryTrait, InvoiceTransactionRepositoryTrait};
use invoice_infra::{ConnectionHub, PushNotifier, TransactionCleanupService};
use invoice_storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Transaction Store
    pub transactions: Arc<dyn InvoiceTransactionRepositoryTrait>,
    /// Document Store
    pub invoices: Arc<dyn InvoiceRepositoryTrait>,
    pub storage: Arc<dyn Storage>,
    /// Open push-channel sockets on this node.
    pub hub: Arc<ConnectionHub>,
    /// Where status updates go. The hub itself in production.
    pub notifier: Arc<dyn PushNotifier>,
    /// Identifies the node owning the sockets, recorded on each transaction.
    pub node_endpoint: String,
    /// Purge loop handle, stopped on shutdown.
    pub cleanup_service: Option<TransactionCleanupService>,
}

impl AppState {
    /// State whose notifications go through the node's own connection hub.
    pub fn new(
        config: Config,
        transactions: Arc<dyn InvoiceTransactionRepositoryTrait>,
        invoices: Arc<dyn InvoiceRepositoryTrait>,
        storage: Arc<dyn Storage>,
        node_endpoint: String,
    ) -> Self {
        let hub = Arc::new(ConnectionHub::default());
        Self {
            config: Arc::new(config),
            transactions,
            invoices,
            storage,
            notifier: hub.clone(),
            hub,
            node_endpoint,
            cleanup_service: None,
        }
    }

    /// Replace the notifier, e.g. with a recording one in tests.
    pub fn with_notifier(mut self, notifier: Arc<dyn PushNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_cleanup_service(mut self, service: Option<TransactionCleanupService>) -> Self {
        self.cleanup_service = service;
        self
    }
}
