// src/contracts/issuer_registry.rs
//! Trusted issuer registry contract interface.

use crate::blockchain::tezos_client::TezosClient;
use crate::error::CapabilityError;
use async_trait::async_trait;
use serde_json::Value;

/// Read access to the registry of issuers a verifier may trust.
#[async_trait]
pub trait TrustRegistry: Send + Sync {
    /// `Ok(false)` for unknown issuers as well as explicitly untrusted ones.
    async fn is_trusted(&self, issuer_id: &str) -> Result<bool, CapabilityError>;
}

/// Trust registry stored in a bigmap of a Tezos contract, keyed by issuer DID.
pub struct IssuerRegistryContract {
    client: TezosClient,
    address: String,
    bigmap: String,
}

impl IssuerRegistryContract {
    pub fn new(client: TezosClient, address: &str, bigmap: &str) -> Self {
        IssuerRegistryContract {
            client,
            address: address.to_string(),
            bigmap: bigmap.to_string(),
        }
    }
}

#[async_trait]
impl TrustRegistry for IssuerRegistryContract {
    async fn is_trusted(&self, issuer_id: &str) -> Result<bool, CapabilityError> {
        let value = self
            .client
            .bigmap_value(&self.address, &self.bigmap, issuer_id)
            .await?;
        Ok(value.as_ref().is_some_and(is_truthy))
    }
}

/// Interprets a registry value as a trust flag.
///
/// The indexer renders Michelson `bool` as JSON `true`/`false`; older
/// registries stored `"true"`/`"True"` strings or `nat` flags.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(flag) => flag.eq_ignore_ascii_case("true"),
        Value::Number(flag) => flag.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}
