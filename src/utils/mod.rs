// src/utils/mod.rs
//! Helper functions.

pub mod http;
pub mod serialization;
