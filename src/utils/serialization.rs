// src/utils/serialization.rs
//! Serialization utilities for the gateway.
//!
//! Provides:
//! - JSON (de)serialization used when handing documents to collaborators
//! - Michelson `bytes` encoding for TZIP-12 metadata maps

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Serializes a value to a compact JSON string.
///
/// # Returns
/// - `Ok(String)` with JSON representation on success
/// - `Err(serde_json::Error)` if serialization fails
pub fn serialize<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(data)
}

/// Deserializes a value from a JSON string.
pub fn deserialize<'a, T: Deserialize<'a>>(data: &'a str) -> Result<T, serde_json::Error> {
    serde_json::from_str(data)
}

/// Encodes a UTF-8 string as the hex payload of a Michelson `bytes` value.
///
/// # Example
/// `"ipfs://Qm"` becomes `"697066733a2f2f516d"`.
pub fn char_to_bytes(text: &str) -> String {
    hex::encode(text.as_bytes())
}

/// Builds the TZIP-12 `token_info` map that points at off-chain metadata.
///
/// The empty key carries the metadata URI, per TZIP-12.
pub fn token_info(metadata_uri: &str) -> Value {
    json!({ "": char_to_bytes(metadata_uri) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_bytes() {
        assert_eq!(char_to_bytes("ipfs://Qm"), "697066733a2f2f516d");
        assert_eq!(char_to_bytes(""), "");
    }

    #[test]
    fn test_token_info_uses_empty_key() {
        let info = token_info("ipfs://Qm");
        assert_eq!(info[""], "697066733a2f2f516d");
    }

    #[test]
    fn test_json_helpers() {
        let text = serialize(&json!({ "a": 1 })).unwrap();
        assert_eq!(text, r#"{"a":1}"#);
        let value: Value = deserialize(&text).unwrap();
        assert_eq!(value["a"], 1);
    }
}
