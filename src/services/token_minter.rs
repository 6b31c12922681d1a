// src/services/token_minter.rs
//! Token minting and metadata query service.
//!
//! Minting pins the metadata document to IPFS, then mints a token whose
//! TZIP-12 metadata points at the pinned document. Queries read token metadata
//! back from the ledger, either by id or by walking the token bigmap.

use crate::contracts::token_registry::TokenLedger;
use crate::error::CapabilityError;
use crate::models::token::{MintReceipt, TokenKind, TokenMetadata};
use crate::storage::ipfs_client::{metadata_uri, MetadataPinner};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Failure of a mint request, split by stage.
#[derive(Error, Debug)]
pub enum MintError {
    /// Metadata could not be pinned; nothing was sent to the ledger.
    #[error("{0}")]
    Pinning(#[source] CapabilityError),

    /// Metadata was pinned but the mint operation failed.
    #[error("{0}")]
    Minting(#[source] CapabilityError),
}

/// Service for minting tokens and reading their metadata.
#[derive(Clone)]
pub struct TokenMinter {
    pinner: Arc<dyn MetadataPinner>,
    ledger: Arc<dyn TokenLedger>,
}

impl TokenMinter {
    pub fn new(pinner: Arc<dyn MetadataPinner>, ledger: Arc<dyn TokenLedger>) -> Self {
        Self { pinner, ledger }
    }

    /// Pins `metadata` and mints a token of `kind` referencing it.
    ///
    /// # Returns
    /// Receipt carrying the operation hash
    pub async fn mint(&self, kind: TokenKind, metadata: &Value) -> Result<MintReceipt, MintError> {
        log::info!("IPFS pinning {} metadata...", kind);
        let cid = self
            .pinner
            .pin_json(metadata)
            .await
            .map_err(MintError::Pinning)?;

        let uri = metadata_uri(&cid);
        log::info!("Minting {} token for {}", kind, uri);
        let hash = self
            .ledger
            .mint(kind, &uri)
            .await
            .map_err(MintError::Minting)?;

        log::info!("Mint operation injected: {}", hash);
        Ok(MintReceipt::ok(hash))
    }

    /// Metadata of one token.
    pub async fn token(
        &self,
        kind: TokenKind,
        token_id: u64,
    ) -> Result<TokenMetadata, CapabilityError> {
        log::info!("Fetching the token metadata for the {} token ID {}", kind, token_id);
        self.ledger.token_metadata(kind, token_id).await
    }

    /// Every token of `kind` whose name equals `name` exactly.
    pub async fn tokens_by_name(
        &self,
        kind: TokenKind,
        name: &str,
    ) -> Result<Vec<TokenMetadata>, CapabilityError> {
        self.scan(kind, |metadata| metadata.has_name(name)).await
    }

    /// Every token of `kind`, in id order.
    pub async fn all_tokens(&self, kind: TokenKind) -> Result<Vec<TokenMetadata>, CapabilityError> {
        let started = Instant::now();
        let tokens = self.scan(kind, |_| true).await?;
        log::info!(
            "{} {} tokens were returned in {:.3} seconds",
            tokens.len(),
            kind,
            started.elapsed().as_secs_f64()
        );
        Ok(tokens)
    }

    /// Walks token ids from zero until the ledger reports an unknown id.
    ///
    /// Any other lookup error aborts the walk.
    async fn scan<F>(&self, kind: TokenKind, keep: F) -> Result<Vec<TokenMetadata>, CapabilityError>
    where
        F: Fn(&TokenMetadata) -> bool,
    {
        let mut result = Vec::new();
        for token_id in 0.. {
            log::debug!("Fetching the token metadata for the {} token ID {}", kind, token_id);
            match self.ledger.token_metadata(kind, token_id).await {
                Ok(metadata) => {
                    if keep(&metadata) {
                        result.push(metadata);
                    }
                }
                Err(e) if e.is_token_not_found() => {
                    log::debug!("End of {} bigmap was reached at {}", kind, token_id);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(result)
    }
}
