//! Client-scoped log severity, forwarded to the process `tracing` pipeline.
//!
//! Each client instance carries its own [`LogContext`] so two clients in the
//! same process can run at different verbosities. The context only gates
//! severity; formatting and output go through whatever `tracing` subscriber
//! the embedding process installed.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Severity threshold for a client's log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Suppress all client logging.
    Off,
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warn,
    /// Normal operational messages.
    Info,
    /// Verbose diagnostics.
    Debug,
    /// Per-command tracing.
    Trace,
}

/// Per-client logging gate.
#[derive(Debug, Clone, Copy)]
pub struct LogContext {
    level: LogLevel,
}

impl LogContext {
    /// Creates a context that emits messages at `level` and below.
    pub fn new(level: LogLevel) -> Self {
        LogContext { level }
    }

    /// Returns the configured threshold.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Whether a message at `level` would be emitted.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level && self.level != LogLevel::Off
    }

    pub fn error(&self, msg: &str) {
        if self.enabled(LogLevel::Error) {
            tracing::error!(target: "kestrel", "{msg}");
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.enabled(LogLevel::Warn) {
            tracing::warn!(target: "kestrel", "{msg}");
        }
    }

    pub fn info(&self, msg: &str) {
        if self.enabled(LogLevel::Info) {
            tracing::info!(target: "kestrel", "{msg}");
        }
    }

    pub fn debug(&self, msg: &str) {
        if self.enabled(LogLevel::Debug) {
            tracing::debug!(target: "kestrel", "{msg}");
        }
    }

    pub fn trace(&self, msg: &str) {
        if self.enabled(LogLevel::Trace) {
            tracing::trace!(target: "kestrel", "{msg}");
        }
    }
}

impl Default for LogContext {
    fn default() -> Self {
        LogContext::new(LogLevel::Info)
    }
}

static DEFAULT_LOG: Lazy<LogContext> = Lazy::new(LogContext::default);

/// Process-wide default context, used by clients constructed without an
/// explicit logging policy.
pub fn default_log() -> &'static LogContext {
    &DEFAULT_LOG
}
