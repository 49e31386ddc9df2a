//! Command lifecycle: one host request from submission to exactly one
//! terminal callback invocation.

use std::sync::Arc;

use kestrel_core::{BridgeError, CallbackError, ErrorCode, Result};

use crate::context::ClientShared;

/// Lifecycle phases of a command.
///
/// A command advances monotonically; the only permitted shortcut is jumping
/// straight to [`CommandState::Responded`] when an earlier phase fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommandState {
    /// Constructed, arguments not yet validated.
    Created,
    /// Arguments validated and converted to native form.
    Prepared,
    /// Handed to the worker pool.
    Dispatched,
    /// Engine call finished on a worker thread.
    Executed,
    /// Terminal callback invoked (or skipped because the client closed).
    Responded,
    /// Callback and native resources released.
    Disposed,
}

impl CommandState {
    fn successor(self) -> Option<CommandState> {
        match self {
            CommandState::Created => Some(CommandState::Prepared),
            CommandState::Prepared => Some(CommandState::Dispatched),
            CommandState::Dispatched => Some(CommandState::Executed),
            CommandState::Executed => Some(CommandState::Responded),
            CommandState::Responded => Some(CommandState::Disposed),
            CommandState::Disposed => None,
        }
    }

    /// Whether advancing from `self` to `next` is a legal transition.
    pub fn can_advance_to(self, next: CommandState) -> bool {
        self.successor() == Some(next)
            || (next == CommandState::Responded && self < CommandState::Responded)
    }
}

/// Terminal callback: receives either an error or a result, never both.
pub type CommandCallback<R> = Box<dyn FnOnce(Option<CallbackError>, Option<R>) + Send>;

/// A single in-flight operation and the host callback it owes an answer to.
///
/// `R` is the host-facing result type produced in the Respond phase. The
/// callback is invoked exactly once, on the event loop thread, unless the
/// owning client closed first, in which case it is dropped uninvoked.
pub struct Command<R> {
    name: &'static str,
    state: CommandState,
    error: Option<BridgeError>,
    client: Arc<ClientShared>,
    callback: Option<CommandCallback<R>>,
}

impl<R> Command<R> {
    pub fn new(name: &'static str, client: Arc<ClientShared>, callback: CommandCallback<R>) -> Self {
        Command {
            name,
            state: CommandState::Created,
            error: None,
            client,
            callback: Some(callback),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn client(&self) -> &Arc<ClientShared> {
        &self.client
    }

    /// Records a failure without changing phase. The stored error is what
    /// [`Command::respond_error`] will deliver.
    pub fn set_error(&mut self, error: BridgeError) {
        if let Some(existing) = &self.error {
            self.client.log().debug(&format!(
                "command {} replacing error {} with {}",
                self.name, existing, error
            ));
        }
        self.error = Some(error);
    }

    pub fn error(&self) -> Option<&BridgeError> {
        self.error.as_ref()
    }

    /// Advances to `next`, rejecting illegal transitions without changing
    /// state.
    pub fn advance(&mut self, next: CommandState) -> Result<()> {
        if !self.state.can_advance_to(next) {
            return Err(BridgeError::client(format!(
                "command {}: invalid transition {:?} -> {:?}",
                self.name, self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }

    /// Delivers the terminal outcome and disposes the command.
    ///
    /// Must run on the event loop thread. If the client closed while the
    /// command was in flight, the callback is released without being
    /// invoked.
    pub fn respond(mut self, outcome: std::result::Result<R, BridgeError>) {
        if self.state >= CommandState::Responded {
            self.client.log().error(&format!(
                "command {}: duplicate respond in state {:?}",
                self.name, self.state
            ));
            return;
        }
        self.state = CommandState::Responded;

        let callback = self.callback.take();
        if self.client.is_closed() {
            self.client.log().debug(&format!(
                "command {}: client closed, dropping callback",
                self.name
            ));
            self.state = CommandState::Disposed;
            return;
        }

        if let Some(cb) = callback {
            match outcome {
                Ok(result) => cb(None, Some(result)),
                Err(err) => cb(Some(CallbackError::from(&err)), None),
            }
        }
        self.state = CommandState::Disposed;
    }

    /// Delivers the stored error, or a generic client error if none was
    /// recorded.
    pub fn respond_error(mut self) {
        let err = self
            .error
            .take()
            .unwrap_or_else(|| BridgeError::new(ErrorCode::ClientError, "command failed"));
        self.respond(Err(err));
    }
}

impl<R> Drop for Command<R> {
    fn drop(&mut self) {
        // A callback that was never invoked and never deliberately released
        // means the host promise will hang. This only happens on internal
        // plumbing bugs or submissions racing a shutdown.
        if self.callback.is_some() && !self.client.is_closed() {
            self.client.log().error(&format!(
                "command {} dropped in state {:?} without responding",
                self.name, self.state
            ));
        }
    }
}

impl<R> std::fmt::Debug for Command<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("error", &self.error)
            .finish()
    }
}
