use chrono::{DateTime, Utc};
use invoice_core::models::{InvoiceTransaction, InvoiceTransactionStatus};
use invoice_core::AppError;
use sqlx::{PgPool, Row};

/// Transaction Store: one record per upload attempt, keyed by transaction id.
///
/// Expired records (`expires_at <= now`) are invisible to every operation; they
/// behave exactly like unknown ids until `purge_expired` removes them.
#[async_trait::async_trait]
pub trait InvoiceTransactionRepositoryTrait: Send + Sync {
    /// Insert a new record. The id must not already exist.
    async fn create(&self, transaction: &InvoiceTransaction) -> Result<(), AppError>;

    /// Fetch a live record. `None` for unknown or expired ids.
    async fn get(&self, transaction_id: &str) -> Result<Option<InvoiceTransaction>, AppError>;

    /// Unconditionally overwrite the status of a live record.
    async fn update_status(
        &self,
        transaction_id: &str,
        status: InvoiceTransactionStatus,
    ) -> Result<(), AppError>;

    /// Set `status = new` only if the live record currently holds `expected`.
    ///
    /// Returns `false` when the record is missing, expired or holds another status.
    async fn update_status_if(
        &self,
        transaction_id: &str,
        expected: InvoiceTransactionStatus,
        new: InvoiceTransactionStatus,
    ) -> Result<bool, AppError>;

    /// Delete expired records, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, AppError>;
}

fn ensure_persistable(status: InvoiceTransactionStatus) -> Result<(), AppError> {
    if status.is_persistable() {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "Status {} cannot be stored",
            status
        )))
    }
}

/// PostgreSQL-backed Transaction Store
#[derive(Clone)]
pub struct InvoiceTransactionRepository {
    pool: PgPool,
}

impl InvoiceTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InvoiceTransactionRepositoryTrait for InvoiceTransactionRepository {
    #[tracing::instrument(skip(self, transaction), fields(transaction_id = %transaction.transaction_id))]
    async fn create(&self, transaction: &InvoiceTransaction) -> Result<(), AppError> {
        ensure_persistable(transaction.status)?;

        sqlx::query(
            r#"
            INSERT INTO invoice_transactions (
                transaction_id, connection_id, status, request_id, expires_in,
                endpoint, created_at, updated_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&transaction.transaction_id)
        .bind(&transaction.connection_id)
        .bind(transaction.status.as_str())
        .bind(&transaction.request_id)
        .bind(transaction.expires_in)
        .bind(&transaction.endpoint)
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .bind(transaction.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, transaction_id: &str) -> Result<Option<InvoiceTransaction>, AppError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT transaction_id, connection_id, status, request_id, expires_in,
                   endpoint, created_at, updated_at, expires_at
            FROM invoice_transactions
            WHERE transaction_id = $1 AND expires_at > NOW()
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.0))
    }

    async fn update_status(
        &self,
        transaction_id: &str,
        status: InvoiceTransactionStatus,
    ) -> Result<(), AppError> {
        ensure_persistable(status)?;

        let result = sqlx::query(
            r#"
            UPDATE invoice_transactions
            SET status = $2, updated_at = NOW()
            WHERE transaction_id = $1 AND expires_at > NOW()
            "#,
        )
        .bind(transaction_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Transaction {} not found",
                transaction_id
            )));
        }
        Ok(())
    }

    async fn update_status_if(
        &self,
        transaction_id: &str,
        expected: InvoiceTransactionStatus,
        new: InvoiceTransactionStatus,
    ) -> Result<bool, AppError> {
        ensure_persistable(new)?;

        // The status predicate makes read-check-write a single statement.
        let result = sqlx::query(
            r#"
            UPDATE invoice_transactions
            SET status = $3, updated_at = NOW()
            WHERE transaction_id = $1 AND status = $2 AND expires_at > NOW()
            "#,
        )
        .bind(transaction_id)
        .bind(expected.as_str())
        .bind(new.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM invoice_transactions
            WHERE expires_at <= NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

struct TransactionRow(InvoiceTransaction);

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for TransactionRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<InvoiceTransactionStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: e.into(),
            })?;

        Ok(TransactionRow(InvoiceTransaction {
            transaction_id: row.try_get("transaction_id")?,
            connection_id: row.try_get("connection_id")?,
            status,
            request_id: row.try_get("request_id")?,
            expires_in: row.try_get("expires_in")?,
            endpoint: row.try_get("endpoint")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
            expires_at: row.try_get::<DateTime<Utc>, _>("expires_at")?,
        }))
    }
}
