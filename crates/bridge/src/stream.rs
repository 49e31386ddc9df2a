//! Bounded producer/consumer queue for record streams.
//!
//! Scan and query results arrive on worker threads faster than host
//! callbacks can consume them. [`StreamingQueue`] sits between the two: the
//! producer blocks when the queue is full (backpressure against the engine)
//! and drain passes are posted to the event loop in coalesced batches
//! instead of one per record.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use kestrel_core::BridgeError;

use crate::event_loop::LoopHandle;

/// One delivery to the stream consumer.
pub enum StreamItem<T> {
    /// A data item, delivered in push order.
    Item(T),
    /// End of stream, delivered exactly once as the final invocation.
    /// Carries the failure if the stream ended abnormally.
    End(Option<BridgeError>),
}

/// Consumer callback. Returning `false` asks the producer to stop early;
/// items still queued at that point are discarded, and only the end marker
/// follows.
pub type StreamConsumer<T> = Box<dyn FnMut(StreamItem<T>) -> bool + Send>;

/// Schedule a drain after every `capacity / SIGNAL_DIVISOR` pushes.
const SIGNAL_DIVISOR: usize = 8;

struct QueueState<T> {
    buf: VecDeque<StreamItem<T>>,
    ended: bool,
}

/// Bounded queue bridging a producing worker thread to a consumer running
/// on the event loop.
pub struct StreamingQueue<T> {
    state: Mutex<QueueState<T>>,
    space: Condvar,
    capacity: usize,
    signal_every: usize,
    pushed: AtomicUsize,
    stopped: AtomicBool,
    drain_scheduled: AtomicBool,
    handle: LoopHandle,
    consumer: Mutex<Option<StreamConsumer<T>>>,
}

impl<T: Send + 'static> StreamingQueue<T> {
    /// Creates a queue holding at most `capacity` items. The consumer runs
    /// only on the event loop behind `handle`.
    pub fn new(capacity: usize, handle: LoopHandle, consumer: StreamConsumer<T>) -> Arc<Self> {
        Arc::new(StreamingQueue {
            state: Mutex::new(QueueState {
                buf: VecDeque::with_capacity(capacity.min(1024)),
                ended: false,
            }),
            space: Condvar::new(),
            capacity,
            signal_every: (capacity / SIGNAL_DIVISOR).max(1),
            pushed: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
            drain_scheduled: AtomicBool::new(false),
            handle,
            consumer: Mutex::new(Some(consumer)),
        })
    }

    /// Whether the consumer has asked the producer to stop.
    ///
    /// Best-effort: items pushed before the flag is observed are still
    /// delivered.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(AtomicOrdering::Acquire)
    }

    /// Enqueues an item, blocking while the queue is full.
    ///
    /// Returns `false` once the consumer has requested early termination;
    /// the producer should stop pushing.
    pub fn push(self: &Arc<Self>, item: T) -> bool {
        if self.is_stopped() {
            return false;
        }

        let became_full = {
            let mut state = self.state.lock();
            while state.buf.len() >= self.capacity {
                if self.is_stopped() {
                    return false;
                }
                // A full queue must always have a drain in flight, or the
                // producer would wait forever.
                self.schedule_drain();
                self.space.wait(&mut state);
            }
            if state.ended {
                return false;
            }
            state.buf.push_back(StreamItem::Item(item));
            state.buf.len() >= self.capacity
        };

        let pushed = self.pushed.fetch_add(1, AtomicOrdering::Relaxed) + 1;
        if became_full || pushed % self.signal_every == 0 {
            self.schedule_drain();
        }

        !self.is_stopped()
    }

    /// Marks the end of the stream and schedules the final drain.
    ///
    /// The end marker bypasses the capacity bound so termination can never
    /// itself block, and it is delivered even after an early stop.
    pub fn finish(self: &Arc<Self>, result: Result<(), BridgeError>) {
        {
            let mut state = self.state.lock();
            if state.ended {
                return;
            }
            state.ended = true;
            state.buf.push_back(StreamItem::End(result.err()));
        }
        self.schedule_drain();
    }

    fn schedule_drain(self: &Arc<Self>) {
        if self.drain_scheduled.swap(true, AtomicOrdering::AcqRel) {
            return;
        }
        let queue = Arc::clone(self);
        if !self.handle.post(move || queue.drain()) {
            // Loop gone; unblock any waiting producer so it can observe
            // the stop flag and bail out.
            self.drain_scheduled.store(false, AtomicOrdering::Release);
            self.stopped.store(true, AtomicOrdering::Release);
            self.space.notify_all();
        }
    }

    /// Runs on the event loop: delivers everything currently queued.
    fn drain(self: &Arc<Self>) {
        // Clear the flag before draining so a push racing this pass can
        // schedule the next one.
        self.drain_scheduled.store(false, AtomicOrdering::Release);

        let mut consumer_slot = self.consumer.lock();
        loop {
            let item = {
                let mut state = self.state.lock();
                let item = state.buf.pop_front();
                if item.is_some() {
                    self.space.notify_all();
                }
                item
            };
            let Some(item) = item else { break };

            let Some(consumer) = consumer_slot.as_mut() else {
                // Terminal already delivered; discard the leftovers.
                continue;
            };

            match item {
                StreamItem::Item(value) => {
                    // Once stopped, queued items are discarded; only the
                    // end marker still reaches the consumer.
                    if self.is_stopped() {
                        continue;
                    }
                    if !consumer(StreamItem::Item(value)) {
                        self.stopped.store(true, AtomicOrdering::Release);
                        self.space.notify_all();
                    }
                }
                StreamItem::End(err) => {
                    consumer(StreamItem::End(err));
                    *consumer_slot = None;
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for StreamingQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingQueue")
            .field("capacity", &self.capacity)
            .field("pushed", &self.pushed.load(AtomicOrdering::Relaxed))
            .field("stopped", &self.stopped.load(AtomicOrdering::Relaxed))
            .finish()
    }
}
