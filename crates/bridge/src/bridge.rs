//! Three-phase dispatch: prepare on the caller, execute on a worker,
//! respond on the event loop.

use std::sync::Arc;

use parking_lot::Mutex;

use kestrel_core::{BridgeError, Result};

use crate::command::{Command, CommandState};
use crate::event_loop::LoopHandle;
use crate::worker::WorkerPool;

/// Routes commands through the worker pool and back to the event loop.
///
/// `submit` is the single entry point every operation goes through. The
/// phases and their threads:
///
/// - `prepare` runs inline on the submitting thread and converts host
///   arguments into an owned payload. A failure here still reports through
///   the callback, asynchronously, never as a synchronous return.
/// - `execute` runs on a pool worker and performs the blocking engine call.
/// - `respond` runs on the event loop and converts the engine result into
///   the host-facing value handed to the callback.
#[derive(Clone)]
pub struct AsyncBridge {
    pool: Arc<WorkerPool>,
    handle: LoopHandle,
}

impl AsyncBridge {
    pub fn new(pool: Arc<WorkerPool>, handle: LoopHandle) -> Self {
        AsyncBridge { pool, handle }
    }

    pub fn handle(&self) -> &LoopHandle {
        &self.handle
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Submits a command for asynchronous completion.
    ///
    /// The command's callback receives exactly one terminal outcome on the
    /// event loop thread, whichever phase produces it, unless the owning
    /// client closes first.
    pub fn submit<P, O, R>(
        &self,
        mut command: Command<R>,
        prepare: impl FnOnce(&mut Command<R>) -> Result<P>,
        execute: impl FnOnce(P) -> Result<O> + Send + 'static,
        respond: impl FnOnce(O) -> Result<R> + Send + 'static,
    ) where
        P: Send + 'static,
        O: Send + 'static,
        R: Send + 'static,
    {
        let payload = match prepare(&mut command) {
            Ok(payload) => payload,
            Err(err) => {
                command.set_error(err);
                self.post_error(command);
                return;
            }
        };
        if let Err(err) = command.advance(CommandState::Prepared) {
            command.set_error(err);
            self.post_error(command);
            return;
        }

        if let Err(err) = command.advance(CommandState::Dispatched) {
            command.set_error(err);
            self.post_error(command);
            return;
        }

        // The worker closure and the rejection branch below both want the
        // command; the slot hands it to exactly one of them, so a rejected
        // submission can still report through the callback.
        let slot = Arc::new(Mutex::new(Some((command, payload))));
        let worker_slot = Arc::clone(&slot);
        let handle = self.handle.clone();
        let submitted = self.pool.submit(move || {
            let Some((mut command, payload)) = worker_slot.lock().take() else {
                return;
            };
            let outcome = execute(payload);
            if outcome.is_ok() {
                // Infallible from Dispatched.
                let _ = command.advance(CommandState::Executed);
            }
            handle.post(move || {
                command.respond(outcome.and_then(respond));
            });
        });
        if let Err(err) = submitted {
            if let Some((mut command, _)) = slot.lock().take() {
                command.set_error(BridgeError::client(format!(
                    "command dispatch rejected: {err}"
                )));
                self.post_error(command);
            }
        }
    }

    /// Posts the stored-error respond for a command that failed before
    /// reaching a worker.
    fn post_error<R: Send + 'static>(&self, command: Command<R>) {
        self.handle.post(move || command.respond_error());
    }
}
