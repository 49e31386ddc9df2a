//! Serialized callback execution context.
//!
//! The embedding host expects every user-visible callback to run on a single
//! logical thread, one at a time, in posting order. [`EventLoop`] provides
//! that context: one named thread draining a FIFO mailbox of boxed tasks.
//! Worker threads never touch host callbacks directly; they post completion
//! tasks here through a [`LoopHandle`].

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::error;

type Task = Box<dyn FnOnce() + Send>;

/// Handler invoked on the loop thread when a posted task panics.
///
/// A panic inside a host callback must not kill the loop thread; instead it
/// is routed here so the embedding layer can surface it as a fatal error.
pub type FatalHandler = Box<dyn Fn(&str) + Send + Sync>;

struct LoopInner {
    mailbox: Mutex<VecDeque<Task>>,
    task_ready: Condvar,
    shutdown: AtomicBool,
    fatal: Mutex<Option<FatalHandler>>,
}

/// Cloneable posting end of the event loop.
///
/// Any thread may hold a handle and post tasks; the tasks run serially on
/// the loop thread in the order they were posted.
#[derive(Clone)]
pub struct LoopHandle {
    inner: Arc<LoopInner>,
}

impl LoopHandle {
    /// Enqueues a task for execution on the loop thread.
    ///
    /// Returns `false` if the loop has shut down, in which case the task is
    /// dropped without running.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        if self.inner.shutdown.load(AtomicOrdering::Acquire) {
            return false;
        }

        {
            let mut mailbox = self.inner.mailbox.lock();
            // Re-check under the lock so a task cannot slip in between the
            // shutdown store and the final drain.
            if self.inner.shutdown.load(AtomicOrdering::Acquire) {
                return false;
            }
            mailbox.push_back(Box::new(task));
        }

        self.inner.task_ready.notify_one();
        true
    }

    /// Installs the handler invoked when a posted task panics.
    pub fn set_fatal_handler(&self, handler: impl Fn(&str) + Send + Sync + 'static) {
        *self.inner.fatal.lock() = Some(Box::new(handler));
    }
}

impl std::fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopHandle")
            .field("shutdown", &self.inner.shutdown.load(AtomicOrdering::Relaxed))
            .finish()
    }
}

/// Owner of the loop thread.
pub struct EventLoop {
    handle: LoopHandle,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl EventLoop {
    /// Spawns the loop thread, named `kestrel-loop`.
    pub fn new() -> Self {
        let inner = Arc::new(LoopInner {
            mailbox: Mutex::new(VecDeque::new()),
            task_ready: Condvar::new(),
            shutdown: AtomicBool::new(false),
            fatal: Mutex::new(None),
        });

        let inner_clone = Arc::clone(&inner);
        let thread = std::thread::Builder::new()
            .name("kestrel-loop".to_string())
            .spawn(move || loop_thread(&inner_clone))
            .expect("failed to spawn event loop thread");

        EventLoop {
            handle: LoopHandle { inner },
            thread: Mutex::new(Some(thread)),
        }
    }

    /// Returns a posting handle. Handles stay valid after shutdown but
    /// `post` starts returning `false`.
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Signals the loop to exit and joins the thread.
    ///
    /// Tasks already in the mailbox are drained before the thread exits;
    /// posts racing with shutdown are rejected.
    pub fn shutdown(&self) {
        let inner = &self.handle.inner;
        inner.shutdown.store(true, AtomicOrdering::Release);

        // Lock the mailbox before notifying to prevent lost-wakeup: the loop
        // thread between its shutdown check and condvar wait holds this lock,
        // so acquiring it guarantees the thread is either already in wait()
        // (and our notify will wake it) or hasn't checked shutdown yet.
        {
            let _mailbox = inner.mailbox.lock();
            inner.task_ready.notify_all();
        }

        if let Some(thread) = self.thread.lock().take() {
            let _ = thread.join();
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        EventLoop::new()
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn loop_thread(inner: &LoopInner) {
    loop {
        let task = {
            let mut mailbox = inner.mailbox.lock();
            loop {
                if let Some(task) = mailbox.pop_front() {
                    break task;
                }
                if inner.shutdown.load(AtomicOrdering::Acquire) {
                    return;
                }
                inner.task_ready.wait(&mut mailbox);
            }
        };

        // Execute outside the lock. A panicking callback must not take the
        // loop down with it; route the message to the fatal handler instead.
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)) {
            let msg = panic_message(e.as_ref());
            let fatal = inner.fatal.lock();
            match fatal.as_ref() {
                Some(handler) => handler(&msg),
                None => error!("callback panicked with no fatal handler installed: {msg}"),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "(non-string panic)".to_string()
    }
}
