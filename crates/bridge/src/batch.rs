//! Aggregation of multi-record results into a single host callback.
//!
//! A batch engine listener hands over per-record results as borrowed views;
//! everything crossing to the host is deep-copied into owned form first,
//! in submission order.

use kestrel_core::{BridgeError, ErrorCode, Key, Record};
use kestrel_convert::{clone_key, clone_record};

/// One record's outcome as seen inside an engine listener. The references
/// only live for the duration of the listener call.
#[derive(Debug)]
pub struct BatchResultRef<'a> {
    /// Per-record status; `Ok` with no record means the key was not found.
    pub status: ErrorCode,
    pub key: &'a Key,
    pub record: Option<&'a Record>,
}

/// Owned copy of a batch entry, safe to hold past the listener.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedBatchResult {
    pub status: ErrorCode,
    pub key: Key,
    pub record: Option<Record>,
}

impl OwnedBatchResult {
    /// Deep-copies a borrowed entry.
    pub fn capture(entry: &BatchResultRef<'_>) -> Self {
        OwnedBatchResult {
            status: entry.status,
            key: clone_key(entry.key),
            record: entry.record.map(clone_record),
        }
    }
}

/// Terminal outcome of a batch command.
#[derive(Debug)]
pub enum BatchOutcome {
    /// Nothing was delivered; the whole batch failed with this error.
    Failed(BridgeError),
    /// Per-key results in submission order. Individual entries may still
    /// carry non-`Ok` statuses.
    Completed(Vec<OwnedBatchResult>),
}

/// Folds the overall engine status and the delivered results into one
/// outcome.
///
/// Any delivered results win over the overall status: a batch where some
/// keys failed still completes, with the failures expressed per entry. Only
/// a failure with nothing delivered at all surfaces as a batch-level error.
pub fn resolve_batch(
    overall: Result<(), BridgeError>,
    delivered: Vec<OwnedBatchResult>,
) -> BatchOutcome {
    match overall {
        Err(err) if delivered.is_empty() => BatchOutcome::Failed(err),
        _ => BatchOutcome::Completed(delivered),
    }
}
