//! Invoice file bodies used by the pipeline tests.

use serde_json::json;

pub fn invoice_body(customer: &str, number: &str) -> Vec<u8> {
    json!({
        "customerName": customer,
        "invoiceNumber": number,
        "totalValue": 1250.75,
        "productId": "prod-42",
        "quantity": 3
    })
    .to_string()
    .into_bytes()
}

pub fn malformed_body() -> Vec<u8> {
    b"{\"customerName\": \"acme\", \"invoiceNumber\":".to_vec()
}

/// S3 notification body with one record per key.
pub fn storage_event_body(bucket: &str, keys: &[&str]) -> String {
    let records: Vec<_> = keys
        .iter()
        .map(|key| {
            json!({
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": bucket },
                    "object": { "key": key, "size": 128 }
                }
            })
        })
        .collect();
    json!({ "Records": records }).to_string()
}
