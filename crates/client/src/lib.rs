//! Host-facing client surface.
//!
//! [`Client`] exposes the operation set (get, select, exists, put, remove,
//! operate, batch read, scan, query) over any [`NativeEngine`]; the
//! [`MemoryEngine`] provides a process-local reference implementation.

#![warn(clippy::all)]

mod client;
mod engine;
mod mem;
mod policy;
mod result;

pub use client::{Client, ClientConfig, ResultCallback};
pub use engine::{
    BatchVisitor, Filter, NativeEngine, RecordVisitor, Statement, StreamVisitor,
};
pub use mem::MemoryEngine;
pub use policy::{
    BasePolicy, BatchPolicy, GenerationPolicy, QueryPolicy, ReadPolicy, RecordExistsAction,
    RemovePolicy, ScanPolicy, WritePolicy,
};
pub use result::{HostBatchResult, HostReadResult, HostRecord};
