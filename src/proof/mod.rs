// src/proof/mod.rs
//! Proof checks on credentials and presentations.

pub mod signature_verification;
