//! Test doubles for failure injection.

use async_trait::async_trait;
use invoice_core::models::Invoice;
use invoice_core::{AppError, StorageBackend};
use invoice_db::InvoiceRepositoryTrait;
use invoice_storage::{LocalStorage, Storage, StorageError, StorageResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Local storage whose deletes always fail.
pub struct FailingDeleteStorage {
    pub inner: Arc<LocalStorage>,
}

#[async_trait]
impl Storage for FailingDeleteStorage {
    async fn put(&self, storage_key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String> {
        self.inner.put(storage_key, data, content_type).await
    }

    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.inner.get(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        Err(StorageError::DeleteFailed(format!("injected failure for {}", storage_key)))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    async fn size(&self, storage_key: &str) -> StorageResult<u64> {
        self.inner.size(storage_key).await
    }

    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.inner
            .presigned_put_url(storage_key, content_type, expires_in)
            .await
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// Local storage that counts body reads and can park them until released.
pub struct ObservedStorage {
    pub inner: Arc<LocalStorage>,
    gets: AtomicUsize,
    hold_gets: bool,
    entered: Notify,
    release: Notify,
}

impl ObservedStorage {
    pub fn new(inner: Arc<LocalStorage>, hold_gets: bool) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            hold_gets,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Wait until a read is parked.
    pub async fn wait_for_get(&self) {
        self.entered.notified().await;
    }

    pub fn release_get(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl Storage for ObservedStorage {
    async fn put(&self, storage_key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String> {
        self.inner.put(storage_key, data, content_type).await
    }

    async fn get(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.hold_gets {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.get(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.inner.delete(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    async fn size(&self, storage_key: &str) -> StorageResult<u64> {
        self.inner.size(storage_key).await
    }

    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.inner
            .presigned_put_url(storage_key, content_type, expires_in)
            .await
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// Invoice store that rejects every write.
pub struct FailingInvoiceRepository;

#[async_trait]
impl InvoiceRepositoryTrait for FailingInvoiceRepository {
    async fn put(&self, _invoice: &Invoice) -> Result<(), AppError> {
        Err(AppError::Internal("injected invoice store failure".to_string()))
    }

    async fn get(&self, _owner_key: &str, _sort_key: &str) -> Result<Option<Invoice>, AppError> {
        Ok(None)
    }
}
