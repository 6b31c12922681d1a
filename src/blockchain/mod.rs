// src/blockchain/mod.rs
//! Tezos ledger access.

pub mod tezos_client;
