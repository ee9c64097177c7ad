use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::PipelineError;

/// Partition key prefix of every committed invoice.
pub const INVOICE_OWNER_PREFIX: &str = "#invoice_";

/// Body of an uploaded invoice file.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFile {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Customer name must be between 1 and 255 characters"
    ))]
    pub customer_name: String,
    #[validate(length(
        min = 1,
        max = 128,
        message = "Invoice number must be between 1 and 128 characters"
    ))]
    pub invoice_number: String,
    pub total_value: Decimal,
    #[validate(length(min = 1, max = 128, message = "Product id must not be empty"))]
    pub product_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

impl InvoiceFile {
    /// Parse and validate raw object bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, PipelineError> {
        let file: InvoiceFile = serde_json::from_slice(bytes)
            .map_err(|e| PipelineError::ParseFailure(format!("invalid invoice JSON: {}", e)))?;
        file.validate()
            .map_err(|e| PipelineError::ParseFailure(format!("invalid invoice: {}", e)))?;
        Ok(file)
    }

    pub fn owner_key(&self) -> String {
        format!("{}{}", INVOICE_OWNER_PREFIX, self.customer_name)
    }
}

/// Committed invoice, keyed by owner and invoice number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub owner_key: String,
    pub sort_key: String,
    pub total_value: Decimal,
    pub product_id: String,
    pub quantity: i32,
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
    /// `None` means the invoice never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Invoice {
    pub fn from_file(
        file: InvoiceFile,
        transaction_id: &str,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            owner_key: file.owner_key(),
            sort_key: file.invoice_number,
            total_value: file.total_value,
            product_id: file.product_id,
            quantity: file.quantity,
            transaction_id: transaction_id.to_string(),
            created_at,
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_valid_invoice_file() {
        let body = br#"{
            "customerName": "acme",
            "invoiceNumber": "INV-1",
            "totalValue": 150.5,
            "productId": "p-9",
            "quantity": 3
        }"#;
        let file = InvoiceFile::parse(body).unwrap();
        assert_eq!(file.customer_name, "acme");
        assert_eq!(file.total_value, Decimal::from_str("150.5").unwrap());
        assert_eq!(file.owner_key(), "#invoice_acme");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = InvoiceFile::parse(b"not json").unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure(_)));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = InvoiceFile::parse(br#"{"customerName":"acme"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure(_)));
    }

    #[test]
    fn rejects_invalid_values() {
        let body = br#"{
            "customerName": "",
            "invoiceNumber": "INV-1",
            "totalValue": 1,
            "productId": "p",
            "quantity": 0
        }"#;
        let err = InvoiceFile::parse(body).unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure(_)));
    }

    #[test]
    fn invoice_record_uses_owner_and_number_as_key() {
        let file = InvoiceFile {
            customer_name: "acme".into(),
            invoice_number: "INV-7".into(),
            total_value: Decimal::new(1999, 2),
            product_id: "p-1".into(),
            quantity: 2,
        };
        let now = Utc::now();
        let invoice = Invoice::from_file(file, "tx-1", now, None);
        assert_eq!(invoice.owner_key, "#invoice_acme");
        assert_eq!(invoice.sort_key, "INV-7");
        assert_eq!(invoice.transaction_id, "tx-1");
        assert_eq!(invoice.expires_at, None);
    }
}
