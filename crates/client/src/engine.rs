//! The seam between the bridge and a native storage engine.
//!
//! Engine methods hand record data to listeners as borrowed references.
//! The borrow is deliberate: engine-owned buffers are only valid for the
//! duration of the listener call, so anything that must outlive it has to
//! be deep-copied first. The borrow checker enforces what the wire protocol
//! can only document.

use kestrel_bridge::BatchResultRef;
use kestrel_core::{BatchRecord, Key, Operation, Record, Result, Value};

use crate::policy::{BatchPolicy, QueryPolicy, ReadPolicy, RemovePolicy, ScanPolicy, WritePolicy};

/// Visitor over a single engine-owned record.
pub type RecordVisitor<'v> = &'v mut dyn FnMut(&Record);

/// Visitor over one batch of engine-owned results.
pub type BatchVisitor<'v> = &'v mut dyn FnMut(&[BatchResultRef<'_>]);

/// Streaming visitor; return `false` to stop the stream early.
pub type StreamVisitor<'v> = &'v mut dyn FnMut(&Record) -> bool;

/// Secondary-index predicate for a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Bin equals the value exactly.
    Equal(String, Value),
    /// Integer bin falls within the inclusive range.
    Range(String, i64, i64),
}

/// A query statement: what to scan and which records qualify.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub namespace: String,
    pub set: Option<String>,
    /// Restrict returned bins; `None` returns all.
    pub bins: Option<Vec<String>>,
    /// Predicate; `None` degrades to a full set scan.
    pub filter: Option<Filter>,
}

impl Statement {
    pub fn new(namespace: impl Into<String>, set: Option<&str>) -> Self {
        Statement {
            namespace: namespace.into(),
            set: set.map(str::to_string),
            bins: None,
            filter: None,
        }
    }
}

/// Blocking storage engine called from worker threads.
///
/// Implementations may invoke visitors from whatever thread runs the call;
/// the bridge never assumes visitor invocations happen on the event loop.
pub trait NativeEngine: Send + Sync {
    /// Reads a record. `bins` restricts the returned bins; `None` returns
    /// all. Visits exactly once on success; a missing record is a
    /// `NotFound` error.
    fn get(
        &self,
        policy: &ReadPolicy,
        key: &Key,
        bins: Option<&[String]>,
        visit: RecordVisitor<'_>,
    ) -> Result<()>;

    /// Whether a record exists, without reading bin data.
    fn exists(&self, policy: &ReadPolicy, key: &Key) -> Result<bool>;

    /// Writes bins according to the policy's exists and generation rules.
    fn put(&self, policy: &WritePolicy, key: &Key, bins: &[(String, Value)]) -> Result<()>;

    /// Deletes a record. A missing record is a `NotFound` error.
    fn remove(&self, policy: &RemovePolicy, key: &Key) -> Result<()>;

    /// Applies operations in order and visits the resulting record, whose
    /// bins hold the results of the read operations.
    fn operate(
        &self,
        policy: &WritePolicy,
        key: &Key,
        ops: &[Operation],
        visit: RecordVisitor<'_>,
    ) -> Result<()>;

    /// Resolves a batch of requests and visits the full result slice once,
    /// in request order. The overall `Result` reports batch-level failure
    /// only; per-key misses are per-entry statuses.
    fn batch(
        &self,
        policy: &BatchPolicy,
        requests: &[BatchRecord],
        visit: BatchVisitor<'_>,
    ) -> Result<()>;

    /// Streams every record in a namespace (and optionally set) through the
    /// visitor. Stops early when the visitor returns `false`; that is not
    /// an error.
    fn scan(
        &self,
        policy: &ScanPolicy,
        namespace: &str,
        set: Option<&str>,
        visit: StreamVisitor<'_>,
    ) -> Result<()>;

    /// Streams records matching the statement's filter.
    fn query(&self, policy: &QueryPolicy, statement: &Statement, visit: StreamVisitor<'_>)
        -> Result<()>;

    /// Releases engine resources. Called once when the owning client
    /// closes.
    fn close(&self) {}
}
