//! Asynchronous command plumbing for the Kestrel client.
//!
//! This crate owns the machinery between the host-facing API surface and
//! the native engine: the serialized event loop that plays the role of the
//! host execution context, the background worker pool that runs blocking
//! engine calls, the `Command` lifecycle that carries a host callback from
//! submission to exactly one terminal invocation, and the streaming /
//! batch aggregation paths built on top of them.

#![warn(clippy::all)]

mod batch;
mod bridge;
mod command;
mod context;
mod event_loop;
mod log;
mod stream;
mod worker;

pub use batch::{resolve_batch, BatchOutcome, BatchResultRef, OwnedBatchResult};
pub use bridge::AsyncBridge;
pub use command::{Command, CommandCallback, CommandState};
pub use context::ClientShared;
pub use event_loop::{EventLoop, FatalHandler, LoopHandle};
pub use log::{default_log, LogContext, LogLevel};
pub use stream::{StreamConsumer, StreamItem, StreamingQueue};
pub use worker::{PoolError, WorkerPool};
