// src/models/token.rs
//! Token data model for the asset, policy and contract ledgers.
//!
//! Each token kind lives in its own FA2 contract. Token metadata follows
//! TZIP-12: a `name`, optional `decimals`, and whatever else the issuer put in
//! the pinned metadata document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The three token families minted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Asset,
    Policy,
    Contract,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Asset => "asset",
            TokenKind::Policy => "policy",
            TokenKind::Contract => "contract",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a path segment names no known token kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown token type: {0}")]
pub struct UnknownTokenKind(pub String);

impl FromStr for TokenKind {
    type Err = UnknownTokenKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(TokenKind::Asset),
            "policy" => Ok(TokenKind::Policy),
            "contract" => Ok(TokenKind::Contract),
            other => Err(UnknownTokenKind(other.to_string())),
        }
    }
}

/// TZIP-12 token metadata as returned by the ledger.
///
/// Only `token_id` and `name` are interpreted; everything else is carried
/// through to API clients untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub token_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenMetadata {
    pub fn has_name(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// Body of a successful mint response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// Always `"ok"`
    pub status: String,
    /// Operation hash of the mint transaction
    pub hash: String,
}

impl MintReceipt {
    pub fn ok(hash: String) -> Self {
        MintReceipt {
            status: "ok".to_string(),
            hash,
        }
    }
}
