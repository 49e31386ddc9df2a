//! Batch request/result types
//!
//! A batch is one request covering multiple keys; each entry carries its own
//! payload going in and its own status/record slot coming back. The
//! collection is an ordered list fixed at submission time — results arriving
//! out of order are written back into their original slots, never reordered.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::key::Key;
use crate::record::Record;
use crate::value::Value;

/// A single operation within a multi-op write ([`BatchRecord::Write`] or the
/// single-key operate call).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Read one bin back.
    Read(String),
    /// Write a bin.
    Put(String, Value),
    /// Add a delta to an integer bin.
    Add(String, i64),
    /// Append to a string or bytes bin.
    Append(String, Value),
    /// Prepend to a string or bytes bin.
    Prepend(String, Value),
    /// Touch the record (bump generation, reset TTL).
    Touch,
    /// Delete the record.
    Delete,
}

/// One entry in a batch request, tagged by operation type.
///
/// `status`/`record` are the per-entry result slots: `status` starts as
/// [`ErrorCode::Ok`] and is overwritten by the per-record outcome; `record`
/// is populated only when the entry's operation succeeded and returned data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchRecord {
    /// Read a record, optionally projecting specific bins.
    Read {
        /// Key to read.
        key: Key,
        /// Bin projection; `None` means all bins.
        bins: Option<Vec<String>>,
        /// Per-entry result status.
        status: ErrorCode,
        /// Result record when the read succeeded.
        record: Option<Record>,
    },
    /// Apply operations to a record.
    Write {
        /// Key to write.
        key: Key,
        /// Operations to apply.
        ops: Vec<Operation>,
        /// Per-entry result status.
        status: ErrorCode,
        /// Result record when the write returned data.
        record: Option<Record>,
    },
    /// Invoke a server-side UDF on a record.
    Apply {
        /// Key to apply the function to.
        key: Key,
        /// UDF module name.
        module: String,
        /// UDF function name.
        function: String,
        /// UDF arguments.
        args: Vec<Value>,
        /// Per-entry result status.
        status: ErrorCode,
        /// Result record when the apply returned data.
        record: Option<Record>,
    },
    /// Remove a record.
    Remove {
        /// Key to remove.
        key: Key,
        /// Per-entry result status.
        status: ErrorCode,
        /// Result record (metadata of the removed record, when returned).
        record: Option<Record>,
    },
}

impl BatchRecord {
    /// A read entry with default result slots.
    pub fn read(key: Key, bins: Option<Vec<String>>) -> Self {
        BatchRecord::Read {
            key,
            bins,
            status: ErrorCode::Ok,
            record: None,
        }
    }

    /// A write entry with default result slots.
    pub fn write(key: Key, ops: Vec<Operation>) -> Self {
        BatchRecord::Write {
            key,
            ops,
            status: ErrorCode::Ok,
            record: None,
        }
    }

    /// A UDF-apply entry with default result slots.
    pub fn apply(key: Key, module: impl Into<String>, function: impl Into<String>, args: Vec<Value>) -> Self {
        BatchRecord::Apply {
            key,
            module: module.into(),
            function: function.into(),
            args,
            status: ErrorCode::Ok,
            record: None,
        }
    }

    /// A remove entry with default result slots.
    pub fn remove(key: Key) -> Self {
        BatchRecord::Remove {
            key,
            status: ErrorCode::Ok,
            record: None,
        }
    }

    /// The entry's key.
    pub fn key(&self) -> &Key {
        match self {
            BatchRecord::Read { key, .. }
            | BatchRecord::Write { key, .. }
            | BatchRecord::Apply { key, .. }
            | BatchRecord::Remove { key, .. } => key,
        }
    }

    /// The entry's result status.
    pub fn status(&self) -> ErrorCode {
        match self {
            BatchRecord::Read { status, .. }
            | BatchRecord::Write { status, .. }
            | BatchRecord::Apply { status, .. }
            | BatchRecord::Remove { status, .. } => *status,
        }
    }

    /// The entry's result record, when populated.
    pub fn record(&self) -> Option<&Record> {
        match self {
            BatchRecord::Read { record, .. }
            | BatchRecord::Write { record, .. }
            | BatchRecord::Apply { record, .. }
            | BatchRecord::Remove { record, .. } => record.as_ref(),
        }
    }

    /// Write a per-entry result into this slot.
    pub fn set_result(&mut self, new_status: ErrorCode, new_record: Option<Record>) {
        match self {
            BatchRecord::Read { status, record, .. }
            | BatchRecord::Write { status, record, .. }
            | BatchRecord::Apply { status, record, .. }
            | BatchRecord::Remove { status, record, .. } => {
                *status = new_status;
                *record = new_record;
            }
        }
    }
}
