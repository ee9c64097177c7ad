//! In-memory repositories for tests and single-node development.
//!
//! Each map sits behind one `std::sync::Mutex`; no lock is held across an await,
//! so the conditional update is atomic with respect to every other call.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use invoice_core::models::{Invoice, InvoiceTransaction, InvoiceTransactionStatus};
use invoice_core::AppError;

use super::invoice::InvoiceRepositoryTrait;
use super::invoice_transaction::InvoiceTransactionRepositoryTrait;

fn poisoned() -> AppError {
    AppError::Internal("In-memory store lock poisoned".to_string())
}

#[derive(Default)]
pub struct InMemoryInvoiceTransactionRepository {
    records: Mutex<HashMap<String, InvoiceTransaction>>,
}

impl InMemoryInvoiceTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a record's expiry into the past.
    pub fn expire(&self, transaction_id: &str) -> Result<(), AppError> {
        let mut records = self.records.lock().map_err(|_| poisoned())?;
        if let Some(record) = records.get_mut(transaction_id) {
            record.expires_at = Utc::now() - Duration::seconds(1);
        }
        Ok(())
    }

    /// Stored record regardless of expiry.
    pub fn raw(&self, transaction_id: &str) -> Option<InvoiceTransaction> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(transaction_id).cloned())
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl InvoiceTransactionRepositoryTrait for InMemoryInvoiceTransactionRepository {
    async fn create(&self, transaction: &InvoiceTransaction) -> Result<(), AppError> {
        if !transaction.status.is_persistable() {
            return Err(AppError::InvalidInput(format!(
                "Status {} cannot be stored",
                transaction.status
            )));
        }
        let mut records = self.records.lock().map_err(|_| poisoned())?;
        if records.contains_key(&transaction.transaction_id) {
            return Err(AppError::InvalidInput(format!(
                "Transaction {} already exists",
                transaction.transaction_id
            )));
        }
        records.insert(transaction.transaction_id.clone(), transaction.clone());
        Ok(())
    }

    async fn get(&self, transaction_id: &str) -> Result<Option<InvoiceTransaction>, AppError> {
        let records = self.records.lock().map_err(|_| poisoned())?;
        let now = Utc::now();
        Ok(records
            .get(transaction_id)
            .filter(|record| !record.is_expired(now))
            .cloned())
    }

    async fn update_status(
        &self,
        transaction_id: &str,
        status: InvoiceTransactionStatus,
    ) -> Result<(), AppError> {
        if !status.is_persistable() {
            return Err(AppError::InvalidInput(format!(
                "Status {} cannot be stored",
                status
            )));
        }
        let mut records = self.records.lock().map_err(|_| poisoned())?;
        let now = Utc::now();
        match records
            .get_mut(transaction_id)
            .filter(|record| !record.is_expired(now))
        {
            Some(record) => {
                record.status = status;
                record.updated_at = now;
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Transaction {} not found",
                transaction_id
            ))),
        }
    }

    async fn update_status_if(
        &self,
        transaction_id: &str,
        expected: InvoiceTransactionStatus,
        new: InvoiceTransactionStatus,
    ) -> Result<bool, AppError> {
        if !new.is_persistable() {
            return Err(AppError::InvalidInput(format!(
                "Status {} cannot be stored",
                new
            )));
        }
        let mut records = self.records.lock().map_err(|_| poisoned())?;
        let now = Utc::now();
        match records.get_mut(transaction_id) {
            Some(record) if !record.is_expired(now) && record.status == expected => {
                record.status = new;
                record.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let mut records = self.records.lock().map_err(|_| poisoned())?;
        let now = Utc::now();
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        Ok((before - records.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryInvoiceRepository {
    invoices: Mutex<HashMap<(String, String), Invoice>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.invoices.lock().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl InvoiceRepositoryTrait for InMemoryInvoiceRepository {
    async fn put(&self, invoice: &Invoice) -> Result<(), AppError> {
        let mut invoices = self.invoices.lock().map_err(|_| poisoned())?;
        invoices.insert(
            (invoice.owner_key.clone(), invoice.sort_key.clone()),
            invoice.clone(),
        );
        Ok(())
    }

    async fn get(&self, owner_key: &str, sort_key: &str) -> Result<Option<Invoice>, AppError> {
        let invoices = self.invoices.lock().map_err(|_| poisoned())?;
        let now = Utc::now();
        Ok(invoices
            .get(&(owner_key.to_string(), sort_key.to_string()))
            .filter(|invoice| invoice.expires_at.map_or(true, |at| at > now))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_core::models::InvoiceTransactionStatus::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn generated(id: &str) -> InvoiceTransaction {
        InvoiceTransaction::generated(
            id.to_string(),
            "conn-1".to_string(),
            "req-1".to_string(),
            300,
            "node-a".to_string(),
            Utc::now(),
            Duration::seconds(300),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryInvoiceTransactionRepository::new();
        repo.create(&generated("t1")).await.unwrap();

        let record = repo.get("t1").await.unwrap().unwrap();
        assert_eq!(record.status, Generated);
        assert_eq!(record.connection_id, "conn-1");
        assert!(repo.get("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_and_not_found_status() {
        let repo = InMemoryInvoiceTransactionRepository::new();
        repo.create(&generated("t1")).await.unwrap();
        assert!(repo.create(&generated("t1")).await.is_err());

        let mut bogus = generated("t2");
        bogus.status = NotFound;
        assert!(matches!(
            repo.create(&bogus).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_record_is_invisible() {
        let repo = InMemoryInvoiceTransactionRepository::new();
        repo.create(&generated("t1")).await.unwrap();
        repo.expire("t1").unwrap();

        assert!(repo.get("t1").await.unwrap().is_none());
        assert!(!repo.update_status_if("t1", Generated, Received).await.unwrap());
        assert!(matches!(
            repo.update_status("t1", Received).await,
            Err(AppError::NotFound(_))
        ));

        assert_eq!(repo.purge_expired().await.unwrap(), 1);
        assert!(repo.raw("t1").is_none());
    }

    #[tokio::test]
    async fn test_update_status_if_only_matches_expected() {
        let repo = InMemoryInvoiceTransactionRepository::new();
        repo.create(&generated("t1")).await.unwrap();

        assert!(!repo.update_status_if("t1", Received, Processed).await.unwrap());
        assert!(repo.update_status_if("t1", Generated, Received).await.unwrap());
        assert!(!repo.update_status_if("t1", Generated, Cancelled).await.unwrap());
        assert_eq!(repo.get("t1").await.unwrap().unwrap().status, Received);
    }

    #[tokio::test]
    async fn test_concurrent_conditional_updates_have_one_winner() {
        let repo = Arc::new(InMemoryInvoiceTransactionRepository::new());
        repo.create(&generated("t1")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            let target = if i % 2 == 0 { Received } else { Cancelled };
            handles.push(tokio::spawn(async move {
                repo.update_status_if("t1", Generated, target).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_invoice_put_replaces_existing() {
        let repo = InMemoryInvoiceRepository::new();
        let mut invoice = Invoice {
            owner_key: "#invoice_acme".to_string(),
            sort_key: "INV-1".to_string(),
            total_value: Decimal::new(1050, 1),
            product_id: "p-1".to_string(),
            quantity: 1,
            transaction_id: "t1".to_string(),
            created_at: Utc::now(),
            expires_at: None,
        };
        repo.put(&invoice).await.unwrap();

        invoice.quantity = 5;
        invoice.transaction_id = "t2".to_string();
        repo.put(&invoice).await.unwrap();

        assert_eq!(repo.len(), 1);
        let stored = repo.get("#invoice_acme", "INV-1").await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5);
        assert_eq!(stored.transaction_id, "t2");
    }

    #[tokio::test]
    async fn test_expired_invoice_is_invisible() {
        let repo = InMemoryInvoiceRepository::new();
        let invoice = Invoice {
            owner_key: "#invoice_acme".to_string(),
            sort_key: "INV-2".to_string(),
            total_value: Decimal::ONE,
            product_id: "p-1".to_string(),
            quantity: 1,
            transaction_id: "t1".to_string(),
            created_at: Utc::now(),
            expires_at: Some(Utc::now() - Duration::seconds(5)),
        };
        repo.put(&invoice).await.unwrap();
        assert!(repo.get("#invoice_acme", "INV-2").await.unwrap().is_none());
    }
}
