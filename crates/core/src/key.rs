//! Record keys and digests
//!
//! A [`Key`] identifies one record: namespace, optional set, and either a
//! user-supplied value, a 20-byte digest, or both. The digest is the
//! canonical identifier on the wire; when a key is built from a user value
//! the digest is computed eagerly, so every constructed key is immediately
//! usable by the native engine.
//!
//! Invariant: at least one of `user_value` / `digest` is present. The
//! constructors make violating this impossible.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::error::{BridgeError, Result};
use crate::limits::{MAX_NAMESPACE_BYTES, MAX_SET_BYTES};
use crate::value::Value;

/// Length of a record digest in bytes.
pub const DIGEST_LEN: usize = 20;

/// A record digest: fixed-size hash of set + user value.
pub type Digest = [u8; DIGEST_LEN];

// Type tags mixed into the digest so e.g. Int(7) and "7" hash apart.
const TAG_INT: u8 = 1;
const TAG_STRING: u8 = 3;
const TAG_BYTES: u8 = 4;

/// A record key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Namespace the record lives in (≤ 31 bytes).
    pub namespace: String,
    /// Optional set within the namespace (≤ 63 bytes).
    pub set: Option<String>,
    /// The user-supplied key value, when known.
    pub user_value: Option<Value>,
    /// The 20-byte digest; always present once constructed from a value.
    pub digest: Option<Digest>,
}

impl Key {
    /// Build a key from a user value, computing its digest eagerly.
    ///
    /// Only `Int`, `String` and `Bytes` values are digestible; any other
    /// variant is a parameter error. Namespace and set limits are enforced
    /// here, before anything reaches the native engine.
    pub fn new(
        namespace: impl Into<String>,
        set: Option<&str>,
        user_value: Value,
    ) -> Result<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;
        let set = match set {
            Some(s) => {
                validate_set(s)?;
                Some(s.to_string())
            }
            None => None,
        };
        let digest = compute_digest(set.as_deref(), &user_value)?;
        Ok(Key {
            namespace,
            set,
            user_value: Some(user_value),
            digest: Some(digest),
        })
    }

    /// Build a key from an already-known digest (no user value).
    pub fn from_digest(
        namespace: impl Into<String>,
        set: Option<&str>,
        digest: Digest,
    ) -> Result<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;
        let set = match set {
            Some(s) => {
                validate_set(s)?;
                Some(s.to_string())
            }
            None => None,
        };
        Ok(Key {
            namespace,
            set,
            user_value: None,
            digest: Some(digest),
        })
    }

    /// The digest, which is present on every constructed key.
    pub fn digest(&self) -> Option<&Digest> {
        self.digest.as_ref()
    }
}

fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(BridgeError::param("namespace must not be empty"));
    }
    if namespace.len() > MAX_NAMESPACE_BYTES {
        return Err(BridgeError::param(format!(
            "namespace exceeds {} bytes",
            MAX_NAMESPACE_BYTES
        )));
    }
    Ok(())
}

fn validate_set(set: &str) -> Result<()> {
    if set.len() > MAX_SET_BYTES {
        return Err(BridgeError::param(format!(
            "set name exceeds {} bytes",
            MAX_SET_BYTES
        )));
    }
    Ok(())
}

/// Deterministic digest of set + tagged user value.
///
/// SHA-256 truncated to 20 bytes. The set participates so the same user
/// value in two sets produces distinct digests; the namespace does not,
/// matching the engine's partition addressing.
fn compute_digest(set: Option<&str>, value: &Value) -> Result<Digest> {
    let mut hasher = Sha256::new();
    hasher.update(set.unwrap_or("").as_bytes());
    match value {
        Value::Int(i) => {
            hasher.update([TAG_INT]);
            hasher.update(i.to_be_bytes());
        }
        Value::String(s) => {
            hasher.update([TAG_STRING]);
            hasher.update(s.as_bytes());
        }
        Value::Bytes(b) => {
            hasher.update([TAG_BYTES]);
            hasher.update(b);
        }
        other => {
            return Err(BridgeError::param(format!(
                "key value must be Int, String or Bytes, got {}",
                other.type_name()
            )));
        }
    }
    let hash = hasher.finalize();
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&hash[..DIGEST_LEN]);
    Ok(digest)
}
