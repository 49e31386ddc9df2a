//! Shared per-client state referenced by every in-flight command.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::log::LogContext;

/// State shared between a client handle and all of its outstanding commands.
///
/// Commands hold an `Arc<ClientShared>` so that a response arriving after
/// the client has been closed can be detected and dropped instead of being
/// delivered to a dead host callback.
#[derive(Debug)]
pub struct ClientShared {
    closed: AtomicBool,
    log: LogContext,
}

impl ClientShared {
    pub fn new(log: LogContext) -> Self {
        ClientShared {
            closed: AtomicBool::new(false),
            log,
        }
    }

    /// Marks the client closed. Commands that complete after this point
    /// dispose of their callbacks without invoking them.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> &LogContext {
        &self.log
    }
}

impl Default for ClientShared {
    fn default() -> Self {
        ClientShared::new(LogContext::default())
    }
}
