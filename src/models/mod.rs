// src/models/mod.rs
//! Data structures exchanged with clients and external collaborators.

pub mod credential;
pub mod token;
