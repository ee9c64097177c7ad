//! Test helpers: build AppState and router for integration tests.
//!
//! Repositories are the in-memory implementations, storage is a `LocalStorage` in a
//! temp dir and pushes are captured by a `RecordingNotifier` (or go through the
//! connection hub for socket tests), so no database or object store is needed.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use invoice_api::setup::routes;
use invoice_api::state::AppState;
use invoice_core::models::InvoiceTransactionStatus;
use invoice_core::Config;
use invoice_db::{
    InMemoryInvoiceRepository, InMemoryInvoiceTransactionRepository, InvoiceRepositoryTrait,
    InvoiceTransactionRepositoryTrait,
};
use invoice_infra::RecordingNotifier;
use invoice_storage::{LocalStorage, Storage};
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_BASE_URL: &str = "http://localhost:3000/uploads";
pub const TEST_NODE: &str = "test-node:3000";

/// Test application: state plus handles on the concrete test doubles behind it.
pub struct TestApp {
    pub state: Arc<AppState>,
    pub transactions: Arc<InMemoryInvoiceTransactionRepository>,
    pub invoices: Arc<InMemoryInvoiceRepository>,
    pub local: Arc<LocalStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    /// Stored status of a transaction, ignoring expiry.
    pub fn stored_status(&self, transaction_id: &str) -> Option<InvoiceTransactionStatus> {
        self.transactions.raw(transaction_id).map(|tx| tx.status)
    }

    pub fn statuses(&self, connection_id: &str, transaction_id: &str) -> Vec<InvoiceTransactionStatus> {
        self.notifier.statuses(connection_id, transaction_id)
    }

    /// Issue an import URL for `connection_id` and return the new transaction id.
    pub async fn issue(&self, connection_id: &str) -> String {
        invoice_api::issue_import_url(&self.state, connection_id, "req-test")
            .await
            .expect("Failed to issue import URL")
            .transaction_id
    }

    /// Drop `body` in storage under the transaction id, as a client upload would.
    pub async fn upload(&self, transaction_id: &str, body: &[u8]) {
        self.local
            .put(transaction_id, body.to_vec(), "application/json")
            .await
            .expect("Failed to write test object");
    }

    pub async fn object_exists(&self, transaction_id: &str) -> bool {
        self.local
            .exists(transaction_id)
            .await
            .expect("Failed to check test object")
    }

    /// HTTP test server over the full router.
    pub async fn server(&self) -> TestServer {
        let router = routes::setup_routes(&self.state.config, self.state.clone())
            .await
            .expect("Failed to build router");
        TestServer::new(router.into_make_service()).expect("Failed to create test server")
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|local| local as Arc<dyn Storage>, None).await
}

/// Test app whose pushes go through the real connection hub, for socket tests.
///
/// `notifier` stays attached but records nothing.
pub async fn setup_hub_app() -> TestApp {
    let mut app = setup_test_app().await;
    let mut state = (*app.state).clone();
    state.notifier = state.hub.clone();
    app.state = Arc::new(state);
    app
}

/// Test app whose storage is an [`storage::ObservedStorage`] over the local backend.
pub async fn setup_observed_app(hold_gets: bool) -> (TestApp, Arc<storage::ObservedStorage>) {
    let mut observed = None;
    let app = setup_test_app_with(
        |local| {
            let wrapped = Arc::new(storage::ObservedStorage::new(local, hold_gets));
            observed = Some(wrapped.clone());
            wrapped as Arc<dyn Storage>
        },
        None,
    )
    .await;
    let observed = observed.expect("storage wrapper not built");
    (app, observed)
}

/// Build a test app, letting the caller wrap the storage or replace the invoice store.
pub async fn setup_test_app_with<F>(
    wrap_storage: F,
    invoices_override: Option<Arc<dyn InvoiceRepositoryTrait>>,
) -> TestApp
where
    F: FnOnce(Arc<LocalStorage>) -> Arc<dyn Storage>,
{
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config::for_local(
        temp_dir.path().to_string_lossy().to_string(),
        TEST_BASE_URL,
    );

    let local = Arc::new(
        LocalStorage::new(temp_dir.path(), TEST_BASE_URL.to_string())
            .await
            .expect("Failed to create local storage"),
    );
    let storage = wrap_storage(local.clone());

    let transactions = Arc::new(InMemoryInvoiceTransactionRepository::new());
    let invoices = Arc::new(InMemoryInvoiceRepository::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let invoice_store: Arc<dyn InvoiceRepositoryTrait> =
        invoices_override.unwrap_or_else(|| invoices.clone());
    let transaction_store: Arc<dyn InvoiceTransactionRepositoryTrait> = transactions.clone();

    let state = AppState::new(
        config,
        transaction_store,
        invoice_store,
        storage,
        TEST_NODE.to_string(),
    )
    .with_notifier(notifier.clone());

    TestApp {
        state: Arc::new(state),
        transactions,
        invoices,
        local,
        notifier,
        _temp_dir: temp_dir,
    }
}
