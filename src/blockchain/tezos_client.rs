// src/blockchain/tezos_client.rs
//! Tezos ledger client.
//!
//! Reads go to a TzKT-compatible indexer, which exposes contract bigmaps and
//! decoded TZIP-12 token metadata over plain REST. Writes go to an operation
//! gateway, a remote signer that forges, signs and injects contract calls on
//! behalf of the gateway's admin account. Key material never enters this
//! process.

use crate::error::CapabilityError;
use crate::models::token::TokenMetadata;
use crate::utils::http::{endpoint, ensure_success};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};

const INDEXER: &str = "indexer";
const OPERATION_GATEWAY: &str = "operation gateway";

/// Shared HTTP client for ledger reads and writes.
///
/// Cloning is cheap: `reqwest::Client` pools connections internally.
#[derive(Clone, Debug)]
pub struct TezosClient {
    http: reqwest::Client,
    indexer_url: String,
    gateway_url: String,
}

/// Token entry as listed by the indexer's `/v1/tokens` endpoint.
#[derive(Deserialize)]
struct IndexedToken {
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

/// Answer of the operation gateway after injection.
#[derive(Deserialize)]
struct InjectedOperation {
    hash: String,
}

impl TezosClient {
    /// Creates a client for the given indexer and operation gateway base URLs.
    pub fn new(indexer_url: &str, gateway_url: &str) -> Self {
        TezosClient {
            http: reqwest::Client::new(),
            indexer_url: indexer_url.to_string(),
            gateway_url: gateway_url.to_string(),
        }
    }

    /// Fetches the value stored under `key` in a contract bigmap.
    ///
    /// # Returns
    /// - `Ok(Some(value))` if the key exists and is active
    /// - `Ok(None)` if the indexer has no such key, or it was removed
    /// - `Err` on transport failures or unexpected statuses
    pub async fn bigmap_value(
        &self,
        contract: &str,
        bigmap: &str,
        key: &str,
    ) -> Result<Option<Value>, CapabilityError> {
        let url = endpoint(
            &self.indexer_url,
            INDEXER,
            &["v1", "contracts", contract, "bigmaps", bigmap, "keys", key],
        )?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CapabilityError::transport(INDEXER, e))?;

        if matches!(
            response.status(),
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND
        ) {
            return Ok(None);
        }
        let body = ensure_success(INDEXER, response)
            .await?
            .text()
            .await
            .map_err(|e| CapabilityError::transport(INDEXER, e))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let entry: Value = serde_json::from_str(&body)
            .map_err(|e| CapabilityError::decode(INDEXER, e.to_string()))?;
        if entry.is_null() || entry.get("active") == Some(&Value::Bool(false)) {
            return Ok(None);
        }
        Ok(entry.get("value").cloned())
    }

    /// Fetches TZIP-12 metadata of one token.
    ///
    /// # Errors
    /// [`CapabilityError::TokenNotFound`] when the contract has no token with
    /// this id. Callers paging through a token bigmap stop on it.
    pub async fn token_metadata(
        &self,
        contract: &str,
        token_id: u64,
    ) -> Result<TokenMetadata, CapabilityError> {
        let url = endpoint(&self.indexer_url, INDEXER, &["v1", "tokens"])?;
        let token_id_param = token_id.to_string();

        let response = self
            .http
            .get(url)
            .query(&[("contract", contract), ("tokenId", token_id_param.as_str())])
            .send()
            .await
            .map_err(|e| CapabilityError::transport(INDEXER, e))?;

        let tokens: Vec<IndexedToken> = ensure_success(INDEXER, response)
            .await?
            .json()
            .await
            .map_err(|e| CapabilityError::decode(INDEXER, e.to_string()))?;

        let token = tokens
            .into_iter()
            .next()
            .ok_or_else(|| CapabilityError::TokenNotFound {
                contract: contract.to_string(),
                token_id,
            })?;

        let mut fields = token.metadata.unwrap_or_default();
        fields.remove("token_id");
        let name = fields
            .remove("name")
            .and_then(|name| name.as_str().map(str::to_string));

        Ok(TokenMetadata {
            token_id,
            name,
            extra: fields,
        })
    }

    /// Submits a contract call through the operation gateway.
    ///
    /// # Arguments
    /// * `contract` - KT1 address of the target contract
    /// * `entrypoint` - Entrypoint name (e.g. `mint`)
    /// * `parameter` - Michelson-JSON parameter value
    ///
    /// # Returns
    /// Hash of the injected operation
    pub async fn call_entrypoint(
        &self,
        contract: &str,
        entrypoint: &str,
        parameter: Value,
    ) -> Result<String, CapabilityError> {
        let url = endpoint(
            &self.gateway_url,
            OPERATION_GATEWAY,
            &["contracts", contract, "entrypoints", entrypoint],
        )?;

        let response = self
            .http
            .post(url)
            .json(&json!({ "parameter": parameter }))
            .send()
            .await
            .map_err(|e| CapabilityError::transport(OPERATION_GATEWAY, e))?;

        let operation: InjectedOperation = ensure_success(OPERATION_GATEWAY, response)
            .await?
            .json()
            .await
            .map_err(|e| CapabilityError::decode(OPERATION_GATEWAY, e.to_string()))?;

        Ok(operation.hash)
    }
}
