//! Background worker pool for blocking engine calls.
//!
//! The Execute phase of every command runs here so that wire I/O never
//! blocks the event loop. Tasks are plain FIFO; ordering guarantees for
//! host callbacks come from the event loop, not from the pool.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::error;

type Task = Box<dyn FnOnce() + Send>;

/// Reasons a task submission can be rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// The queue is at its configured depth limit.
    #[error("worker pool queue is full")]
    Full,
    /// The pool has been shut down and its threads joined.
    #[error("worker pool is shut down")]
    ShutDown,
}

struct PoolInner {
    queue: Mutex<VecDeque<Task>>,
    work_ready: Condvar,
    drain_cond: Condvar,
    shutdown: AtomicBool,
    queue_depth: AtomicUsize,
    active_tasks: AtomicUsize,
    max_queue_depth: usize,
    tasks_completed: AtomicU64,
}

/// Fixed pool of named worker threads executing tasks in FIFO order.
pub struct WorkerPool {
    inner: Arc<PoolInner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `num_threads` workers named `kestrel-worker-0`,
    /// `kestrel-worker-1`, and so on.
    pub fn new(num_threads: usize, max_queue_depth: usize) -> Self {
        let inner = Arc::new(PoolInner {
            queue: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            drain_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            queue_depth: AtomicUsize::new(0),
            active_tasks: AtomicUsize::new(0),
            max_queue_depth,
            tasks_completed: AtomicU64::new(0),
        });

        let mut workers = Vec::with_capacity(num_threads);
        for i in 0..num_threads {
            let inner_clone = Arc::clone(&inner);
            let handle = std::thread::Builder::new()
                .name(format!("kestrel-worker-{}", i))
                .spawn(move || worker_loop(&inner_clone))
                .expect("failed to spawn worker thread");
            workers.push(handle);
        }

        Self {
            inner,
            workers: Mutex::new(workers),
        }
    }

    /// Submits a task for background execution.
    ///
    /// Admission and enqueue happen under one lock, so concurrent
    /// submitters can never over-admit past the depth limit.
    pub fn submit(&self, work: impl FnOnce() + Send + 'static) -> Result<(), PoolError> {
        {
            let mut queue = self.inner.queue.lock();
            // Reject after shutdown — workers have been joined, the task
            // would never run.
            if self.inner.shutdown.load(AtomicOrdering::Acquire) {
                return Err(PoolError::ShutDown);
            }
            if queue.len() >= self.inner.max_queue_depth {
                return Err(PoolError::Full);
            }
            queue.push_back(Box::new(work));
            self.inner.queue_depth.fetch_add(1, AtomicOrdering::Release);
        }

        self.inner.work_ready.notify_one();
        Ok(())
    }

    /// Whether a submit at this instant would be accepted.
    pub fn is_accepting(&self) -> bool {
        !self.inner.shutdown.load(AtomicOrdering::Acquire)
            && self.inner.queue_depth.load(AtomicOrdering::Acquire) < self.inner.max_queue_depth
    }

    /// Blocks until every queued and in-flight task has completed. Workers
    /// remain running afterwards.
    pub fn drain(&self) {
        let mut queue = self.inner.queue.lock();
        while self.inner.queue_depth.load(AtomicOrdering::Acquire) > 0
            || self.inner.active_tasks.load(AtomicOrdering::Acquire) > 0
        {
            self.inner.drain_cond.wait(&mut queue);
        }
    }

    /// Signals workers to exit and joins them. Remaining queued tasks are
    /// drained before the threads exit.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, AtomicOrdering::Release);

        // Lock the queue before notifying to prevent lost-wakeup: a worker
        // between its shutdown check and condvar wait holds this lock, so
        // acquiring it guarantees the worker is either already in wait()
        // (and our notify will wake it) or hasn't checked shutdown yet.
        {
            let _queue = self.inner.queue.lock();
            self.inner.work_ready.notify_all();
        }

        let mut workers = self.workers.lock();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
    }

    /// Total number of tasks completed since the pool was created.
    pub fn tasks_completed(&self) -> u64 {
        self.inner.tasks_completed.load(AtomicOrdering::Relaxed)
    }
}

/// RAII guard that decrements `active_tasks` and notifies drain waiters on
/// drop, so bookkeeping stays correct even when a task panics.
struct ActiveTaskGuard<'a> {
    inner: &'a PoolInner,
}

impl Drop for ActiveTaskGuard<'_> {
    fn drop(&mut self) {
        let prev_active = self.inner.active_tasks.fetch_sub(1, AtomicOrdering::Release);
        self.inner
            .tasks_completed
            .fetch_add(1, AtomicOrdering::Relaxed);

        // Notify drain waiters only when we just became idle with an empty
        // queue. Lock the queue first: drain() holds it while checking the
        // condition, which closes the lost-wakeup window.
        if prev_active == 1 && self.inner.queue_depth.load(AtomicOrdering::Acquire) == 0 {
            let _queue = self.inner.queue.lock();
            self.inner.drain_cond.notify_all();
        }
    }
}

fn worker_loop(inner: &PoolInner) {
    loop {
        let task = {
            let mut queue = inner.queue.lock();
            loop {
                if let Some(task) = queue.pop_front() {
                    inner.queue_depth.fetch_sub(1, AtomicOrdering::Release);
                    inner.active_tasks.fetch_add(1, AtomicOrdering::Release);
                    break task;
                }
                if inner.shutdown.load(AtomicOrdering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut queue);
            }
        };

        let _guard = ActiveTaskGuard { inner };

        // Execute outside the lock. catch_unwind keeps a panicking task from
        // killing the worker thread; the guard handles bookkeeping either way.
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)) {
            error!(
                "worker task panicked: {:?}",
                e.downcast_ref::<&str>().copied().unwrap_or("(non-string panic)")
            );
        }
    }
}
