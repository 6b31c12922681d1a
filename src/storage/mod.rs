// src/storage/mod.rs
//! IPFS storage layer.

pub mod ipfs_client;
