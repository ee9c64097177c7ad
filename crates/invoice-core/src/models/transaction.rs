use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Status of an invoice import transaction.
///
/// `NotFound` is never persisted; it is only sent to clients when a lookup by
/// transaction id misses (unknown id or expired record).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceTransactionStatus {
    Generated,
    Received,
    Processed,
    Cancelled,
    Failed,
    NotFound,
}

impl InvoiceTransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceTransactionStatus::Generated => "GENERATED",
            InvoiceTransactionStatus::Received => "RECEIVED",
            InvoiceTransactionStatus::Processed => "PROCESSED",
            InvoiceTransactionStatus::Cancelled => "CANCELLED",
            InvoiceTransactionStatus::Failed => "FAILED",
            InvoiceTransactionStatus::NotFound => "NOT_FOUND",
        }
    }

    /// Terminal statuses never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InvoiceTransactionStatus::Processed
                | InvoiceTransactionStatus::Cancelled
                | InvoiceTransactionStatus::Failed
                | InvoiceTransactionStatus::NotFound
        )
    }

    /// Whether a record may be stored with this status.
    pub fn is_persistable(&self) -> bool {
        !matches!(self, InvoiceTransactionStatus::NotFound)
    }
}

impl Display for InvoiceTransactionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceTransactionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENERATED" => Ok(InvoiceTransactionStatus::Generated),
            "RECEIVED" => Ok(InvoiceTransactionStatus::Received),
            "PROCESSED" => Ok(InvoiceTransactionStatus::Processed),
            "CANCELLED" => Ok(InvoiceTransactionStatus::Cancelled),
            "FAILED" => Ok(InvoiceTransactionStatus::Failed),
            "NOT_FOUND" => Ok(InvoiceTransactionStatus::NotFound),
            _ => Err(anyhow::anyhow!("Invalid invoice transaction status: {}", s)),
        }
    }
}

/// One upload attempt, tracked from URL issuance to a terminal outcome.
///
/// The transaction id doubles as the object storage key of the uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTransaction {
    pub transaction_id: String,
    /// Push-channel endpoint captured when the URL was issued. Never refreshed.
    pub connection_id: String,
    pub status: InvoiceTransactionStatus,
    /// Id of the request that issued the URL.
    pub request_id: String,
    /// Lifetime of the issued write target, in seconds.
    pub expires_in: i64,
    /// Node that owned the push channel at issuance.
    pub endpoint: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl InvoiceTransaction {
    /// Build a fresh `GENERATED` record expiring `ttl` after `now`.
    pub fn generated(
        transaction_id: String,
        connection_id: String,
        request_id: String,
        expires_in: i64,
        endpoint: String,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            transaction_id,
            connection_id,
            status: InvoiceTransactionStatus::Generated,
            request_id,
            expires_in,
            endpoint,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            InvoiceTransactionStatus::Generated,
            InvoiceTransactionStatus::Received,
            InvoiceTransactionStatus::Processed,
            InvoiceTransactionStatus::Cancelled,
            InvoiceTransactionStatus::Failed,
            InvoiceTransactionStatus::NotFound,
        ] {
            assert_eq!(status.as_str().parse::<InvoiceTransactionStatus>().unwrap(), status);
        }
        assert!("generated".parse::<InvoiceTransactionStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_wire_name() {
        let json = serde_json::to_string(&InvoiceTransactionStatus::NotFound).unwrap();
        assert_eq!(json, "\"NOT_FOUND\"");
    }

    #[test]
    fn not_found_is_never_persistable() {
        assert!(!InvoiceTransactionStatus::NotFound.is_persistable());
        assert!(InvoiceTransactionStatus::Generated.is_persistable());
        assert!(!InvoiceTransactionStatus::Generated.is_terminal());
        assert!(!InvoiceTransactionStatus::Received.is_terminal());
    }

    #[test]
    fn generated_record_expires_after_ttl() {
        let now = Utc::now();
        let tx = InvoiceTransaction::generated(
            "t1".into(),
            "c1".into(),
            "r1".into(),
            300,
            "node-a".into(),
            now,
            Duration::seconds(120),
        );
        assert_eq!(tx.status, InvoiceTransactionStatus::Generated);
        assert!(!tx.is_expired(now));
        assert!(tx.is_expired(now + Duration::seconds(120)));
    }
}
