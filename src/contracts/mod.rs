// src/contracts/mod.rs
//! On-chain contract interfaces consumed by the gateway.

pub mod issuer_registry;
pub mod publication_log;
pub mod token_registry;
