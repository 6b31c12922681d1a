// src/contracts/token_registry.rs
//! FA2 token contracts for assets, policies and contracts.
//!
//! Each token kind has its own FA2 contract with a `mint` entrypoint taking a
//! list of `{ to_, metadata }` records. Token metadata is readable per id
//! through the TZIP-12 token metadata bigmap.

use crate::blockchain::tezos_client::TezosClient;
use crate::error::CapabilityError;
use crate::models::token::{TokenKind, TokenMetadata};
use crate::utils::serialization::token_info;
use async_trait::async_trait;
use serde_json::json;

/// Mint and read access to the token ledgers.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Mints one token of `kind` whose metadata lives at `metadata_uri`.
    ///
    /// Returns the operation hash.
    async fn mint(&self, kind: TokenKind, metadata_uri: &str) -> Result<String, CapabilityError>;

    /// Fetches metadata of a single token.
    ///
    /// # Errors
    /// [`CapabilityError::TokenNotFound`] past the last minted id.
    async fn token_metadata(
        &self,
        kind: TokenKind,
        token_id: u64,
    ) -> Result<TokenMetadata, CapabilityError>;
}

/// Contract addresses of the three token ledgers.
#[derive(Debug, Clone)]
pub struct TokenContracts {
    pub asset: String,
    pub policy: String,
    pub contract: String,
}

impl TokenContracts {
    pub fn address(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Asset => &self.asset,
            TokenKind::Policy => &self.policy,
            TokenKind::Contract => &self.contract,
        }
    }
}

/// [`TokenLedger`] backed by FA2 contracts on Tezos.
pub struct Fa2TokenRegistry {
    client: TezosClient,
    contracts: TokenContracts,
    /// Owner of every minted token
    recipient: String,
}

impl Fa2TokenRegistry {
    pub fn new(client: TezosClient, contracts: TokenContracts, recipient: &str) -> Self {
        Fa2TokenRegistry {
            client,
            contracts,
            recipient: recipient.to_string(),
        }
    }
}

#[async_trait]
impl TokenLedger for Fa2TokenRegistry {
    async fn mint(&self, kind: TokenKind, metadata_uri: &str) -> Result<String, CapabilityError> {
        let parameter = json!([{
            "to_": self.recipient,
            "metadata": token_info(metadata_uri),
        }]);
        self.client
            .call_entrypoint(self.contracts.address(kind), "mint", parameter)
            .await
    }

    async fn token_metadata(
        &self,
        kind: TokenKind,
        token_id: u64,
    ) -> Result<TokenMetadata, CapabilityError> {
        self.client
            .token_metadata(self.contracts.address(kind), token_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{mock, server_url, Matcher};

    fn registry() -> Fa2TokenRegistry {
        Fa2TokenRegistry::new(
            TezosClient::new(&server_url(), &server_url()),
            TokenContracts {
                asset: "KT1RegAsset".into(),
                policy: "KT1RegPolicy".into(),
                contract: "KT1RegContract".into(),
            },
            "tz1Na21NimuuPXcQdHUk2en2XWYe9McyDDgZ",
        )
    }

    #[test]
    fn test_address_per_kind() {
        let registry = registry();
        assert_eq!(registry.contracts.address(TokenKind::Asset), "KT1RegAsset");
        assert_eq!(registry.contracts.address(TokenKind::Policy), "KT1RegPolicy");
        assert_eq!(registry.contracts.address(TokenKind::Contract), "KT1RegContract");
    }

    #[tokio::test]
    async fn test_mint_sends_fa2_parameter() {
        let _m = mock("POST", "/contracts/KT1RegPolicy/entrypoints/mint")
            .match_body(Matcher::Json(json!({
                "parameter": [{
                    "to_": "tz1Na21NimuuPXcQdHUk2en2XWYe9McyDDgZ",
                    "metadata": { "": "697066733a2f2f516d54657374" }
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"hash":"opPolicyMint"}"#)
            .create();

        let hash = registry()
            .mint(TokenKind::Policy, "ipfs://QmTest")
            .await
            .unwrap();
        assert_eq!(hash, "opPolicyMint");
    }
}
