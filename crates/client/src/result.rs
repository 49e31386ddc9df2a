//! Owned, host-typed results handed to callbacks.

use kestrel_convert::{clone_key, to_host, HostValue};
use kestrel_core::{Key, Record};

use kestrel_bridge::OwnedBatchResult;

/// A record converted to host values, safe to hold indefinitely.
#[derive(Debug, Clone, PartialEq)]
pub struct HostRecord {
    /// The key this record answers for. Identifies streamed records even
    /// when bin data is suppressed.
    pub key: Key,
    /// Bin name/value pairs in storage order.
    pub bins: Vec<(String, HostValue)>,
    /// Server-side modification counter.
    pub generation: u32,
    /// Remaining time to live in seconds.
    pub ttl: u32,
}

impl HostRecord {
    /// Converts a native record. Total; every native value has a host
    /// representation.
    pub fn from_record(record: &Record) -> Self {
        HostRecord {
            key: clone_key(&record.key),
            bins: record
                .bins
                .iter()
                .map(|(name, value)| (name.clone(), to_host(value)))
                .collect(),
            generation: record.generation,
            ttl: record.ttl,
        }
    }

    /// Looks up a bin by name.
    pub fn bin(&self, name: &str) -> Option<&HostValue> {
        self.bins.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Outcome of a single-record read.
///
/// A missing record is not an error: the key comes back with `record`
/// absent, and the callback sees no error.
#[derive(Debug, Clone, PartialEq)]
pub struct HostReadResult {
    /// The key the read answered for, echoed back.
    pub key: Key,
    /// Present when the record exists.
    pub record: Option<HostRecord>,
}

impl HostReadResult {
    pub fn found(&self) -> bool {
        self.record.is_some()
    }
}

/// One entry of a completed batch, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct HostBatchResult {
    /// Numeric per-entry status; zero is success.
    pub status: i32,
    /// The key the entry answers for.
    pub key: Key,
    /// Present when the entry found a record.
    pub record: Option<HostRecord>,
}

impl HostBatchResult {
    pub fn from_owned(entry: &OwnedBatchResult) -> Self {
        HostBatchResult {
            status: entry.status.code(),
            key: clone_key(&entry.key),
            record: entry.record.as_ref().map(HostRecord::from_record),
        }
    }
}
