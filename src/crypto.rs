//! Hashing primitives for hashledger
//!
//! Every digest in the ledger goes through this module so that block hashes,
//! proof-of-work guesses and node identifiers share one encoding.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Number of random bytes behind a node identifier (rendered as 32 hex chars).
pub const NODE_IDENTIFIER_BYTES: usize = 16;

/// SHA-256 of `data` as a lowercase hex string.
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_ref());
    hex::encode(hasher.finalize())
}

/// Compact JSON text with object keys in sorted order.
///
/// serde_json backs `Map` with a `BTreeMap` unless `preserve_order` is
/// enabled, so rendering a `Value` yields keys in lexicographic order at
/// every nesting level.
pub fn canonical_json(value: &Value) -> String {
    value.to_string()
}

/// The canonical hash of a JSON document: SHA-256 over its sorted-key form.
pub fn canonical_hash(value: &Value) -> String {
    sha256_hex(canonical_json(value))
}

/// Generate a random node identifier (same shape as a UUIDv4 without dashes).
pub fn generate_node_identifier() -> String {
    let bytes: [u8; NODE_IDENTIFIER_BYTES] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({
            "sender": "A",
            "recipient": "B",
            "amount": 10,
            "nested": { "z": 1, "a": [ { "y": true, "b": null } ] }
        });
        assert_eq!(
            canonical_json(&value),
            r#"{"amount":10,"nested":{"a":[{"b":null,"y":true}],"z":1},"recipient":"B","sender":"A"}"#
        );
    }

    #[test]
    fn test_canonical_hash_ignores_insertion_order() {
        let mut first = serde_json::Map::new();
        first.insert("index".to_string(), json!(1));
        first.insert("proof".to_string(), json!(100));

        let mut second = serde_json::Map::new();
        second.insert("proof".to_string(), json!(100));
        second.insert("index".to_string(), json!(1));

        assert_eq!(
            canonical_hash(&Value::Object(first)),
            canonical_hash(&Value::Object(second))
        );
    }

    #[test]
    fn test_node_identifier_shape() {
        let id = generate_node_identifier();
        assert_eq!(id.len(), NODE_IDENTIFIER_BYTES * 2);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(id, generate_node_identifier());
    }
}
