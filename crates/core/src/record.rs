//! Records: key + metadata + ordered bins
//!
//! A [`Record`] is created fresh per request, mutated only while results are
//! being marshalled, and destroyed when the owning command completes. Bins
//! are kept as an ordered vector so the marshalled host object preserves the
//! order the engine delivered.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::key::Key;
use crate::limits::MAX_BIN_NAME_BYTES;
use crate::value::Value;

/// TTL sentinel: record never expires.
pub const TTL_NEVER_EXPIRE: u32 = u32::MAX;

/// TTL sentinel: leave the record's TTL unchanged on update.
pub const TTL_DONT_UPDATE: u32 = u32::MAX - 1;

/// A single record: key, generation/ttl metadata, and named bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The record's key.
    pub key: Key,
    /// Write generation counter.
    pub generation: u32,
    /// Time-to-live in seconds, or one of the TTL sentinels.
    pub ttl: u32,
    /// Named values, in delivery order.
    pub bins: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record for a key.
    pub fn new(key: Key) -> Self {
        Record {
            key,
            generation: 0,
            ttl: TTL_NEVER_EXPIRE,
            bins: Vec::new(),
        }
    }

    /// Add a bin, validating its name length.
    pub fn set_bin(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(BridgeError::param("bin name must not be empty"));
        }
        if name.len() > MAX_BIN_NAME_BYTES {
            return Err(BridgeError::param(format!(
                "bin name '{}' exceeds {} bytes",
                name, MAX_BIN_NAME_BYTES
            )));
        }
        // Replace in place to keep one entry per name
        if let Some(slot) = self.bins.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.bins.push((name, value));
        }
        Ok(())
    }

    /// Look up a bin by name.
    pub fn bin(&self, name: &str) -> Option<&Value> {
        self.bins.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True when the record carries no bins (metadata-only result).
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> Key {
        Key::new("test", Some("demo"), Value::Int(1)).unwrap()
    }

    #[test]
    fn test_new_record_defaults() {
        let rec = Record::new(test_key());
        assert_eq!(rec.generation, 0);
        assert_eq!(rec.ttl, TTL_NEVER_EXPIRE);
        assert!(rec.is_empty());
    }

    #[test]
    fn test_set_and_get_bin() {
        let mut rec = Record::new(test_key());
        rec.set_bin("name", Value::String("alice".into())).unwrap();
        rec.set_bin("age", Value::Int(30)).unwrap();
        assert_eq!(rec.bin("name"), Some(&Value::String("alice".into())));
        assert_eq!(rec.bin("age"), Some(&Value::Int(30)));
        assert_eq!(rec.bin("missing"), None);
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn test_set_bin_replaces_existing() {
        let mut rec = Record::new(test_key());
        rec.set_bin("n", Value::Int(1)).unwrap();
        rec.set_bin("n", Value::Int(2)).unwrap();
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.bin("n"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_bins_preserve_order() {
        let mut rec = Record::new(test_key());
        for name in ["c", "a", "b"] {
            rec.set_bin(name, Value::Int(0)).unwrap();
        }
        let names: Vec<&str> = rec.bins.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_bin_name_limits() {
        let mut rec = Record::new(test_key());
        assert!(rec.set_bin("", Value::Nil).is_err());
        let long = "b".repeat(MAX_BIN_NAME_BYTES + 1);
        assert!(rec.set_bin(long, Value::Nil).is_err());
        let max = "b".repeat(MAX_BIN_NAME_BYTES);
        assert!(rec.set_bin(max, Value::Nil).is_ok());
    }

    #[test]
    fn test_ttl_sentinels_distinct() {
        assert_ne!(TTL_NEVER_EXPIRE, TTL_DONT_UPDATE);
    }
}
