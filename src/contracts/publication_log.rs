// src/contracts/publication_log.rs
//! Credential publication log contract interface.
//!
//! The issuer side of the system records, per credential subject, whether the
//! subject's credential metadata was anchored on-chain. The verifier only reads
//! that log.

use crate::blockchain::tezos_client::TezosClient;
use crate::error::CapabilityError;
use async_trait::async_trait;
use serde_json::Value;

/// Status message written once a subject's credentials are anchored.
pub const PUBLISHED_MESSAGE: &str = "Credentials have been published to the blockchain";

/// One publication log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub message: String,
}

impl LogEntry {
    /// True only for the exact canonical published status.
    pub fn is_published(&self) -> bool {
        self.message == PUBLISHED_MESSAGE
    }
}

/// Read access to the publication log, keyed by subject DID.
#[async_trait]
pub trait PublicationLog: Send + Sync {
    async fn lookup(&self, subject_id: &str) -> Result<Option<LogEntry>, CapabilityError>;
}

/// Publication log stored in a bigmap of a Tezos contract.
pub struct PublicationLogContract {
    client: TezosClient,
    address: String,
    bigmap: String,
}

impl PublicationLogContract {
    pub fn new(client: TezosClient, address: &str, bigmap: &str) -> Self {
        PublicationLogContract {
            client,
            address: address.to_string(),
            bigmap: bigmap.to_string(),
        }
    }
}

#[async_trait]
impl PublicationLog for PublicationLogContract {
    async fn lookup(&self, subject_id: &str) -> Result<Option<LogEntry>, CapabilityError> {
        let value = self
            .client
            .bigmap_value(&self.address, &self.bigmap, subject_id)
            .await?;
        Ok(value.and_then(|value| parse_entry(&value)))
    }
}

/// Reads a log record from its bigmap value.
///
/// Records are either a bare status string or a Michelson pair decoded by the
/// indexer into an object carrying a `message` field.
fn parse_entry(value: &Value) -> Option<LogEntry> {
    let message = match value {
        Value::String(message) => message,
        Value::Object(record) => record.get("message")?.as_str()?,
        _ => return None,
    };
    Some(LogEntry {
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{mock, server_url};
    use serde_json::json;

    #[test]
    fn test_parse_entry_shapes() {
        let entry = parse_entry(&json!({ "message": PUBLISHED_MESSAGE, "timestamp": "2022-05-01" }));
        assert!(entry.unwrap().is_published());

        let entry = parse_entry(&json!("Credentials are pending"));
        assert_eq!(entry.clone().unwrap().message, "Credentials are pending");
        assert!(!entry.unwrap().is_published());

        assert!(parse_entry(&json!({ "status": 1 })).is_none());
        assert!(parse_entry(&json!(42)).is_none());
    }

    #[test]
    fn test_published_requires_exact_message() {
        let entry = LogEntry {
            message: format!("{PUBLISHED_MESSAGE}."),
        };
        assert!(!entry.is_published());
    }

    #[tokio::test]
    async fn test_lookup_through_indexer() {
        let _m = mock("GET", "/v1/contracts/KT1PubLog/bigmaps/logs/keys/did:tz:subject-log")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "active": true, "value": { "message": PUBLISHED_MESSAGE } }).to_string())
            .create();

        let log = PublicationLogContract::new(
            TezosClient::new(&server_url(), &server_url()),
            "KT1PubLog",
            "logs",
        );
        let entry = log.lookup("did:tz:subject-log").await.unwrap();
        assert_eq!(
            entry,
            Some(LogEntry {
                message: PUBLISHED_MESSAGE.to_string()
            })
        );
    }
}
