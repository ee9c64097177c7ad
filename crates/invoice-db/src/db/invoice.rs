use chrono::{DateTime, Utc};
use invoice_core::models::Invoice;
use invoice_core::AppError;
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Document Store: committed invoices keyed by (owner key, invoice number).
#[async_trait::async_trait]
pub trait InvoiceRepositoryTrait: Send + Sync {
    /// Write an invoice, replacing any existing one with the same key.
    async fn put(&self, invoice: &Invoice) -> Result<(), AppError>;

    async fn get(&self, owner_key: &str, sort_key: &str) -> Result<Option<Invoice>, AppError>;
}

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InvoiceRepositoryTrait for InvoiceRepository {
    #[tracing::instrument(skip(self, invoice), fields(owner_key = %invoice.owner_key, sort_key = %invoice.sort_key))]
    async fn put(&self, invoice: &Invoice) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (
                owner_key, sort_key, total_value, product_id, quantity,
                transaction_id, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (owner_key, sort_key) DO UPDATE SET
                total_value = EXCLUDED.total_value,
                product_id = EXCLUDED.product_id,
                quantity = EXCLUDED.quantity,
                transaction_id = EXCLUDED.transaction_id,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&invoice.owner_key)
        .bind(&invoice.sort_key)
        .bind(invoice.total_value)
        .bind(&invoice.product_id)
        .bind(invoice.quantity)
        .bind(&invoice.transaction_id)
        .bind(invoice.created_at)
        .bind(invoice.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, owner_key: &str, sort_key: &str) -> Result<Option<Invoice>, AppError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT owner_key, sort_key, total_value, product_id, quantity,
                   transaction_id, created_at, expires_at
            FROM invoices
            WHERE owner_key = $1 AND sort_key = $2
              AND (expires_at IS NULL OR expires_at > NOW())
            "#,
        )
        .bind(owner_key)
        .bind(sort_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Invoice::from))
    }
}

/// Row type for the invoices table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    owner_key: String,
    sort_key: String,
    total_value: Decimal,
    product_id: String,
    quantity: i32,
    transaction_id: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice {
            owner_key: row.owner_key,
            sort_key: row.sort_key,
            total_value: row.total_value,
            product_id: row.product_id,
            quantity: row.quantity,
            transaction_id: row.transaction_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}
