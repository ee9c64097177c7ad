//! Push-channel message shapes.
//!
//! Outbound frames are either a status update or the issued upload target.
//! Inbound frames carry an `action` naming the route.

use serde::{Deserialize, Serialize};

use super::transaction::InvoiceTransactionStatus;

/// Frame sent to a connected client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PushMessage {
    Status(StatusMessage),
    ImportUrl(ImportUrlMessage),
    Error(ErrorMessage),
}

impl PushMessage {
    pub fn status(transaction_id: impl Into<String>, status: InvoiceTransactionStatus) -> Self {
        PushMessage::Status(StatusMessage {
            transaction_id: transaction_id.into(),
            status,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        PushMessage::Error(ErrorMessage {
            error: message.into(),
        })
    }

    pub fn to_json(&self) -> String {
        // Serializing these plain structs cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    pub transaction_id: String,
    pub status: InvoiceTransactionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportUrlMessage {
    pub url: String,
    /// Seconds until the URL stops accepting writes.
    pub expires: i64,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorMessage {
    pub error: String,
}

/// Frame received from a connected client.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "action")]
pub enum PushRequest {
    #[serde(rename = "getImportUrl")]
    GetImportUrl,
    #[serde(rename = "cancelImport", rename_all = "camelCase")]
    CancelImport { transaction_id: String },
}
