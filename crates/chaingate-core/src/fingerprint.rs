//! Canonical request fingerprinting for response caching and coalescing.
//!
//! Parameters are streamed into a SHA-256 hasher in a canonical textual form:
//!
//! | value   | bytes fed to the hasher                          |
//! |---------|--------------------------------------------------|
//! | bool    | `true` / `false`                                 |
//! | integer | decimal                                          |
//! | float   | fixed notation, six decimals (`1.500000`)        |
//! | string  | lower-cased                                      |
//! | array   | each element, in order                           |
//! | object  | for each key in sorted order: key bytes, value   |
//!
//! The stream digest is hashed once more and hex encoded. Keys produced by
//! other gateway instances must match byte for byte, so the encoding above is
//! frozen.

use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// The parameters cannot be fingerprinted; the request is not cacheable.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("unsupported type for value during hash: {0}")]
    UnsupportedType(String),
}

/// Compute `"<method>:<hex digest>"` over `params`.
pub fn cache_hash(method: &str, params: &[Value]) -> Result<String, FingerprintError> {
    let mut hasher = Sha256::new();
    for param in params {
        hash_value(&mut hasher, param)?;
    }
    let digest = Sha256::digest(hasher.finalize());
    Ok(format!("{method}:{}", hex::encode(digest)))
}

fn hash_value(hasher: &mut Sha256, value: &Value) -> Result<(), FingerprintError> {
    match value {
        Value::Bool(b) => hasher.update(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                hasher.update(i.to_string());
            } else if let Some(u) = n.as_u64() {
                hasher.update(u.to_string());
            } else if let Some(f) = n.as_f64() {
                hasher.update(format!("{f:.6}"));
            } else {
                return Err(FingerprintError::UnsupportedType(n.to_string()));
            }
        }
        Value::String(s) => hasher.update(s.to_lowercase()),
        Value::Array(items) => {
            for item in items {
                hash_value(hasher, item)?;
            }
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            for key in keys {
                hasher.update(key.as_bytes());
                hash_value(hasher, &map[key.as_str()])?;
            }
        }
        Value::Null => return Err(FingerprintError::UnsupportedType("null".into())),
    }
    Ok(())
}
