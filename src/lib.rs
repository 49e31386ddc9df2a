//! Kestrel - asynchronous database client bridge
//!
//! Kestrel connects a callback-driven host environment to a blocking
//! record-store engine: argument marshalling between host and native value
//! models, a serialized callback thread, a worker pool for blocking engine
//! calls, and aggregation for batch and streaming results.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use kestrel::{Client, ClientConfig, HostValue, Key, MemoryEngine, Value, WritePolicy};
//!
//! let client = Client::connect(ClientConfig::default(), Arc::new(MemoryEngine::new()))?;
//!
//! let key = Key::new("test", Some("users"), Value::from("alice"))?;
//! let bins = HostValue::Object(vec![("name".into(), HostValue::String("Alice".into()))]);
//! client.put(WritePolicy::default(), key, bins, Box::new(|err, key| {
//!     assert!(err.is_none());
//! }));
//! ```
//!
//! # Architecture
//!
//! Each operation passes through four phases: Prepare (validate and convert
//! arguments, inline), Execute (blocking engine call, worker thread),
//! Respond (convert results to host values and invoke the callback, on the
//! single callback thread), Dispose. Failures in any phase still report
//! through the callback; nothing fails synchronously.

pub use kestrel_bridge::{
    default_log, BatchOutcome, LogContext, LogLevel, StreamItem,
};
pub use kestrel_client::*;
pub use kestrel_convert::{
    clone_key, clone_record, clone_value, to_host, to_native, HostValue, MAX_SAFE_INTEGER,
    MIN_SAFE_INTEGER,
};
pub use kestrel_core::{
    BatchRecord, BridgeError, CallbackError, Digest, ErrorCode, Key, MapOrder, Operation, Record,
    Result, SourceLocation, Value, DIGEST_LEN, MAX_BIN_NAME_BYTES, MAX_NAMESPACE_BYTES,
    MAX_SET_BYTES, TTL_DONT_UPDATE, TTL_NEVER_EXPIRE,
};
