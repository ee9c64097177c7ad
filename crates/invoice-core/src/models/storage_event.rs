//! Object-created notifications, in the S3 event notification shape.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageEventRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageEventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct S3Object {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A single object-created trigger. `key` is the transaction id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCreated {
    pub bucket: String,
    pub key: String,
    /// Object size reported by the notification, if any.
    pub size: Option<u64>,
}

impl StorageEvent {
    /// Flatten into triggers, decoding keys the way S3 encodes them
    /// (`+` for spaces, `%xx` escapes).
    pub fn into_triggers(self) -> Vec<ObjectCreated> {
        self.records
            .into_iter()
            .map(|record| ObjectCreated {
                bucket: record.s3.bucket.name,
                key: decode_object_key(&record.s3.object.key),
                size: record.s3.object.size,
            })
            .collect()
    }

    pub fn single(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            records: vec![StorageEventRecord {
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: bucket.into(),
                    },
                    object: S3Object {
                        key: key.into(),
                        size: None,
                    },
                },
            }],
        }
    }
}

fn decode_object_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_s3_notification_body() {
        let body = r#"{
            "Records": [
                {"eventName": "ObjectCreated:Put",
                 "s3": {"bucket": {"name": "invoices"}, "object": {"key": "abc-123", "size": 42}}},
                {"s3": {"bucket": {"name": "invoices"}, "object": {"key": "def-456"}}}
            ]
        }"#;
        let event: StorageEvent = serde_json::from_str(body).unwrap();
        let triggers = event.into_triggers();
        assert_eq!(triggers.len(), 2);
        assert_eq!(triggers[0].bucket, "invoices");
        assert_eq!(triggers[0].key, "abc-123");
        assert_eq!(triggers[0].size, Some(42));
        assert_eq!(triggers[1].key, "def-456");
        assert_eq!(triggers[1].size, None);
    }

    #[test]
    fn decodes_encoded_keys() {
        assert_eq!(decode_object_key("a+b%2Fc"), "a b/c");
        assert_eq!(decode_object_key("plain"), "plain");
        assert_eq!(decode_object_key("bad%zz"), "bad%zz");
    }

    #[test]
    fn empty_body_yields_no_triggers() {
        let event: StorageEvent = serde_json::from_str("{}").unwrap();
        assert!(event.into_triggers().is_empty());
    }
}
