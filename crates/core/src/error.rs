//! Error types for the Kestrel bridge
//!
//! The bridge's error taxonomy (spec'd at the callback contract):
//! parameter and client errors are produced locally and short-circuit before
//! dispatch; server errors carry the engine's status code; per-record batch
//! errors are recorded in their [`crate::BatchRecord`] slot and never
//! escalate to a command-level failure.
//!
//! `thiserror` provides `Display`/`Error`; construction sites capture their
//! source location through `#[track_caller]`, so the file/line that raised an
//! error travels with it without manual plumbing.

use serde::{Deserialize, Serialize};
use std::panic::Location;
use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Status codes surfaced through the callback contract.
///
/// Non-negative codes mirror the native engine's server statuses; negative
/// codes are produced by the client/bridge itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Operation succeeded
    Ok,
    /// Generic server-side failure
    ServerError,
    /// Record does not exist
    NotFound,
    /// Generation check failed on a write
    Generation,
    /// Record already exists and the write policy forbids it
    KeyExists,
    /// Operation timed out (engine-side policy)
    Timeout,
    /// Record is too big for the engine to store
    RecordTooBig,
    /// Namespace unknown to the cluster
    InvalidNamespace,
    /// Whole-batch request failed before per-record processing
    BatchFailed,
    /// Generic client-side failure (engine unreachable, pool shut down)
    ClientError,
    /// Malformed or missing host input, detected during Prepare
    ParamError,
    /// Operation abandoned because the client was closed
    ClientAborted,
}

impl ErrorCode {
    /// Numeric form of the code, as delivered to host callbacks.
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::Ok => 0,
            ErrorCode::ServerError => 1,
            ErrorCode::NotFound => 2,
            ErrorCode::Generation => 3,
            ErrorCode::KeyExists => 5,
            ErrorCode::Timeout => 9,
            ErrorCode::RecordTooBig => 13,
            ErrorCode::InvalidNamespace => 20,
            ErrorCode::BatchFailed => -16,
            ErrorCode::ClientError => -1,
            ErrorCode::ParamError => -2,
            ErrorCode::ClientAborted => -5,
        }
    }

    /// True for statuses the bridge treats as client-local.
    pub fn is_client_side(self) -> bool {
        self.code() < 0
    }
}

/// Source position captured when an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file
    pub file: &'static str,
    /// Line within the file
    pub line: u32,
}

impl SourceLocation {
    /// Capture the caller's position.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = Location::caller();
        SourceLocation {
            file: loc.file(),
            line: loc.line(),
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// The bridge error type.
///
/// `in_doubt` signals that a write may or may not have been applied — an
/// ambiguous outcome that callers must distinguish from a clean failure.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message} (code {}, at {location})", code.code())]
pub struct BridgeError {
    /// Status code
    pub code: ErrorCode,
    /// Human-readable description
    pub message: String,
    /// Where the error was raised
    pub location: SourceLocation,
    /// Whether a write outcome is ambiguous
    pub in_doubt: bool,
}

impl BridgeError {
    /// Create an error with the caller's source location.
    #[track_caller]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        BridgeError {
            code,
            message: message.into(),
            location: SourceLocation::caller(),
            in_doubt: false,
        }
    }

    /// Parameter error: malformed or missing host input.
    #[track_caller]
    pub fn param(message: impl Into<String>) -> Self {
        BridgeError::new(ErrorCode::ParamError, message)
    }

    /// Client error: engine unreachable, pool unavailable, and the like.
    #[track_caller]
    pub fn client(message: impl Into<String>) -> Self {
        BridgeError::new(ErrorCode::ClientError, message)
    }

    /// Record-not-found server status.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        BridgeError::new(ErrorCode::NotFound, message)
    }

    /// Operation abandoned because the client was closed.
    #[track_caller]
    pub fn aborted(message: impl Into<String>) -> Self {
        BridgeError::new(ErrorCode::ClientAborted, message)
    }

    /// Mark the write outcome as ambiguous.
    pub fn with_in_doubt(mut self, in_doubt: bool) -> Self {
        self.in_doubt = in_doubt;
        self
    }
}

/// Host-visible error shape, as passed to user callbacks.
///
/// `callback(error, result)` receives `None` on success or this object on
/// failure — never both an error and a success payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackError {
    /// Numeric status code
    pub code: i32,
    /// Human-readable description
    pub message: String,
    /// Source file that raised the error
    pub file: String,
    /// Line within the file
    pub line: u32,
    /// Whether a write outcome is ambiguous
    pub in_doubt: bool,
}

impl From<&BridgeError> for CallbackError {
    fn from(err: &BridgeError) -> Self {
        CallbackError {
            code: err.code.code(),
            message: err.message.clone(),
            file: err.location.file.to_string(),
            line: err.location.line,
            in_doubt: err.in_doubt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_numeric() {
        assert_eq!(ErrorCode::Ok.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 2);
        assert_eq!(ErrorCode::ClientError.code(), -1);
        assert_eq!(ErrorCode::ParamError.code(), -2);
        assert_eq!(ErrorCode::BatchFailed.code(), -16);
    }

    #[test]
    fn test_client_side_classification() {
        assert!(ErrorCode::ParamError.is_client_side());
        assert!(ErrorCode::ClientAborted.is_client_side());
        assert!(!ErrorCode::NotFound.is_client_side());
        assert!(!ErrorCode::Ok.is_client_side());
    }

    #[test]
    fn test_aborted_constructor() {
        let err = BridgeError::aborted("client is closed");
        assert_eq!(err.code, ErrorCode::ClientAborted);
        assert_eq!(err.code.code(), -5);
        assert!(err.code.is_client_side());
    }

    #[test]
    fn test_error_captures_location() {
        let err = BridgeError::param("bad bin value");
        assert_eq!(err.location.file, file!());
        assert!(err.location.line > 0);
    }

    #[test]
    fn test_error_display() {
        let err = BridgeError::new(ErrorCode::Timeout, "deadline exceeded");
        let msg = err.to_string();
        assert!(msg.contains("deadline exceeded"));
        assert!(msg.contains("code 9"));
    }

    #[test]
    fn test_in_doubt_defaults_false() {
        let err = BridgeError::client("socket reset");
        assert!(!err.in_doubt);
        let err = err.with_in_doubt(true);
        assert!(err.in_doubt);
    }

    #[test]
    fn test_callback_error_conversion() {
        let err = BridgeError::not_found("no such record").with_in_doubt(true);
        let cb = CallbackError::from(&err);
        assert_eq!(cb.code, 2);
        assert_eq!(cb.message, "no such record");
        assert_eq!(cb.file, file!());
        assert_eq!(cb.line, err.location.line);
        assert!(cb.in_doubt);
    }

    #[test]
    fn test_result_alias() {
        fn ok() -> Result<i32> {
            Ok(7)
        }
        fn fail() -> Result<i32> {
            Err(BridgeError::param("nope"))
        }
        assert_eq!(ok().unwrap(), 7);
        assert!(fail().is_err());
    }
}
