// src/storage/ipfs_client.rs
//! IPFS storage client for token metadata.
//!
//! Minting pins the client-supplied metadata document to IPFS first and puts
//! the resulting `ipfs://<cid>` URI on-chain. The node's HTTP API does the
//! content addressing and pinning; this module only drives it.
//!
//! # Security Considerations
//! - Pinned documents are public (IPFS is a public network)
//! - CIDs are permanent; a pinned document cannot be amended, only replaced

use crate::error::CapabilityError;
use crate::utils::serialization::serialize;
use async_trait::async_trait;
use ipfs_api_backend_hyper::{IpfsApi, IpfsClient, TryFromUri};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tokio::task;

/// Scheme prefix of on-chain metadata URIs.
pub const IPFS_URI_SCHEME: &str = "ipfs://";

/// Pins JSON documents to content-addressed storage.
#[async_trait]
pub trait MetadataPinner: Send + Sync {
    /// Pins `document` and returns its CID.
    async fn pin_json(&self, document: &Value) -> Result<String, CapabilityError>;
}

/// Builds the on-chain metadata URI for a CID.
pub fn metadata_uri(cid: &str) -> String {
    format!("{IPFS_URI_SCHEME}{cid}")
}

/// Thread-safe IPFS client wrapper.
///
/// Uses `ipfs-api-backend-hyper` under the hood. Its request futures are not
/// `Send`, so each call runs on a blocking thread with its own single-threaded
/// runtime, keeping the public futures usable from axum handlers.
#[derive(Clone)]
pub struct IpfsStorage {
    /// Shared IPFS client instance (thread-safe via Arc)
    client: Arc<IpfsClient>,
}

impl IpfsStorage {
    /// Creates a client for the IPFS HTTP API at `api_url`
    /// (e.g. `http://localhost:5001`).
    pub fn new(api_url: &str) -> Result<Self, CapabilityError> {
        let client = IpfsClient::from_str(api_url)
            .map_err(|e| CapabilityError::Ipfs(format!("invalid IPFS API URL {api_url}: {e}")))?;
        Ok(IpfsStorage {
            client: Arc::new(client),
        })
    }

    /// Adds raw bytes to IPFS and pins the result recursively.
    ///
    /// # Returns
    /// The CID (Content Identifier) of the stored data
    pub async fn store_data(&self, data: &[u8]) -> Result<String, CapabilityError> {
        let client = self.client.clone();
        let data_owned = data.to_vec();

        task::spawn_blocking(move || -> Result<String, CapabilityError> {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| CapabilityError::Ipfs(e.to_string()))?;
            rt.block_on(async {
                let added = client
                    .add(Cursor::new(data_owned))
                    .await
                    .map_err(|e| CapabilityError::Ipfs(e.to_string()))?;
                client
                    .pin_add(&added.hash, true)
                    .await
                    .map_err(|e| CapabilityError::Ipfs(e.to_string()))?;
                Ok(added.hash)
            })
        })
        .await
        .map_err(|join_err| CapabilityError::Ipfs(join_err.to_string()))?
    }
}

#[async_trait]
impl MetadataPinner for IpfsStorage {
    async fn pin_json(&self, document: &Value) -> Result<String, CapabilityError> {
        let json_str = serialize(document).map_err(|e| CapabilityError::Ipfs(e.to_string()))?;
        self.store_data(json_str.as_bytes()).await
    }
}
