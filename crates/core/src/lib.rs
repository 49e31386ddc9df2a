//! Core types for the Kestrel client bridge
//!
//! This crate defines the foundational types shared by every layer of the
//! bridge:
//! - Value: tagged union for dynamic record data
//! - Key: namespaced record identifier with an eagerly computed digest
//! - Record: key + metadata + ordered bins
//! - BatchRecord: per-key request/result slot for multi-key operations
//! - Error: status codes and the bridge error type
//! - Limits: size constraints enforced at the API boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod error;
pub mod key;
pub mod limits;
pub mod record;
pub mod value;

pub use batch::{BatchRecord, Operation};
pub use error::{BridgeError, CallbackError, ErrorCode, Result, SourceLocation};
pub use key::{Digest, Key, DIGEST_LEN};
pub use limits::{MAX_BIN_NAME_BYTES, MAX_NAMESPACE_BYTES, MAX_SET_BYTES};
pub use record::{Record, TTL_DONT_UPDATE, TTL_NEVER_EXPIRE};
pub use value::{MapOrder, Value};
