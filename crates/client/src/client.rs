//! Host-facing client: owns the event loop, the worker pool, and the
//! engine, and turns host calls into bridge commands.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use kestrel_bridge::{
    resolve_batch, AsyncBridge, BatchOutcome, ClientShared, Command, EventLoop, LogContext,
    LogLevel, LoopHandle, OwnedBatchResult, StreamConsumer, StreamItem, StreamingQueue,
    WorkerPool,
};
use kestrel_convert::{clone_record, to_native, HostValue};
use kestrel_core::{
    BatchRecord, BridgeError, CallbackError, ErrorCode, Key, Operation, Result, Value,
    MAX_BIN_NAME_BYTES,
};

use crate::engine::{NativeEngine, Statement};
use crate::policy::{BatchPolicy, QueryPolicy, ReadPolicy, RemovePolicy, ScanPolicy, WritePolicy};
use crate::result::{HostBatchResult, HostReadResult, HostRecord};

/// Client construction knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Worker threads running blocking engine calls.
    pub worker_threads: usize,
    /// Maximum queued commands before submissions are rejected.
    pub max_queue_depth: usize,
    /// Per-stream buffer size for scan and query results.
    pub stream_capacity: usize,
    /// Severity threshold for this client's log output.
    pub log_level: LogLevel,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            worker_threads: 4,
            max_queue_depth: 4096,
            stream_capacity: 256,
            log_level: LogLevel::Info,
        }
    }
}

/// Callback for operations that complete with a single result.
///
/// Receives an error or a result, never both, on the client's callback
/// thread.
pub type ResultCallback<R> = Box<dyn FnOnce(Option<CallbackError>, Option<R>) + Send>;

/// Asynchronous database client.
///
/// Every operation validates its arguments inline, runs the engine call on
/// a worker thread, and reports through its callback on the client's single
/// callback thread, preserving completion order. Failures also report
/// through the callback; operations never fail synchronously.
///
/// The one exception is a closed client: operations submitted after
/// [`Client::close`] invoke their callback immediately on the calling
/// thread with an aborted error, since the callback thread is gone.
pub struct Client {
    config: ClientConfig,
    engine: Arc<dyn NativeEngine>,
    shared: Arc<ClientShared>,
    event_loop: EventLoop,
    pool: Arc<WorkerPool>,
    bridge: AsyncBridge,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Connects a client over the given engine.
    pub fn connect(config: ClientConfig, engine: Arc<dyn NativeEngine>) -> Result<Client> {
        if config.worker_threads == 0 {
            return Err(BridgeError::param("worker_threads must be at least 1"));
        }
        if config.stream_capacity == 0 {
            return Err(BridgeError::param("stream_capacity must be at least 1"));
        }

        let shared = Arc::new(ClientShared::new(LogContext::new(config.log_level)));
        let event_loop = EventLoop::new();
        let pool = Arc::new(WorkerPool::new(config.worker_threads, config.max_queue_depth));
        let bridge = AsyncBridge::new(Arc::clone(&pool), event_loop.handle());

        shared.log().info(&format!(
            "client connected: {} worker(s), queue depth {}",
            config.worker_threads, config.max_queue_depth
        ));
        Ok(Client {
            config,
            engine,
            shared,
            event_loop,
            pool,
            bridge,
        })
    }

    /// Installs the handler invoked when a host callback panics.
    pub fn set_fatal_handler(&self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.event_loop.handle().set_fatal_handler(handler);
    }

    /// Closes the client: no further callbacks fire once this returns.
    ///
    /// In-flight engine calls are drained first; their responses are
    /// silently discarded. Idempotent.
    pub fn close(&self) {
        if self.shared.is_closed() {
            return;
        }
        self.shared.close();
        self.pool.shutdown();
        self.event_loop.shutdown();
        self.engine.close();
        self.shared.log().info("client closed");
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    fn handle(&self) -> LoopHandle {
        self.event_loop.handle()
    }

    /// Builds the command for an operation, or reports inline when the
    /// client is already closed.
    fn command<R: Send + 'static>(
        &self,
        name: &'static str,
        callback: ResultCallback<R>,
    ) -> Option<Command<R>> {
        if self.shared.is_closed() {
            let err = BridgeError::aborted("client is closed");
            callback(Some(CallbackError::from(&err)), None);
            return None;
        }
        Some(Command::new(name, Arc::clone(&self.shared), callback))
    }

    /// Reads a whole record. A missing record is not an error: the result
    /// echoes the key with no record attached.
    pub fn get(&self, policy: ReadPolicy, key: Key, callback: ResultCallback<HostReadResult>) {
        let Some(command) = self.command("get", callback) else {
            return;
        };
        let engine = Arc::clone(&self.engine);
        self.bridge.submit(
            command,
            move |_| Ok((policy, key)),
            move |(policy, key)| fetch_optional(&*engine, &policy, key, None),
            Ok,
        );
    }

    /// Reads only the named bins. Same miss contract as [`Client::get`].
    pub fn select(
        &self,
        policy: ReadPolicy,
        key: Key,
        bins: Vec<String>,
        callback: ResultCallback<HostReadResult>,
    ) {
        let Some(command) = self.command("select", callback) else {
            return;
        };
        let engine = Arc::clone(&self.engine);
        self.bridge.submit(
            command,
            move |_| {
                if bins.is_empty() {
                    return Err(BridgeError::param("select requires at least one bin name"));
                }
                for name in &bins {
                    validate_bin_name(name)?;
                }
                Ok((policy, key, bins))
            },
            move |(policy, key, bins)| fetch_optional(&*engine, &policy, key, Some(bins.as_slice())),
            Ok,
        );
    }

    /// Checks record existence without reading bins.
    pub fn exists(&self, policy: ReadPolicy, key: Key, callback: ResultCallback<bool>) {
        let Some(command) = self.command("exists", callback) else {
            return;
        };
        let engine = Arc::clone(&self.engine);
        self.bridge.submit(
            command,
            move |_| Ok((policy, key)),
            move |(policy, key)| engine.exists(&policy, &key),
            Ok,
        );
    }

    /// Writes host bins to a record. The callback receives the key back on
    /// success.
    pub fn put(
        &self,
        policy: WritePolicy,
        key: Key,
        bins: HostValue,
        callback: ResultCallback<Key>,
    ) {
        let Some(command) = self.command("put", callback) else {
            return;
        };
        let engine = Arc::clone(&self.engine);
        self.bridge.submit(
            command,
            move |_| {
                let native = native_bins(&bins)?;
                Ok((policy, key, native))
            },
            move |(policy, key, native)| {
                engine.put(&policy, &key, &native)?;
                Ok(key)
            },
            Ok,
        );
    }

    /// Deletes a record. The callback receives the key back on success; a
    /// missing record reports `NotFound`.
    pub fn remove(&self, policy: RemovePolicy, key: Key, callback: ResultCallback<Key>) {
        let Some(command) = self.command("remove", callback) else {
            return;
        };
        let engine = Arc::clone(&self.engine);
        self.bridge.submit(
            command,
            move |_| Ok((policy, key)),
            move |(policy, key)| {
                engine.remove(&policy, &key)?;
                Ok(key)
            },
            Ok,
        );
    }

    /// Applies operations atomically and returns the read results.
    pub fn operate(
        &self,
        policy: WritePolicy,
        key: Key,
        ops: Vec<Operation>,
        callback: ResultCallback<HostRecord>,
    ) {
        let Some(command) = self.command("operate", callback) else {
            return;
        };
        let engine = Arc::clone(&self.engine);
        self.bridge.submit(
            command,
            move |_| {
                if ops.is_empty() {
                    return Err(BridgeError::param("operate requires at least one operation"));
                }
                Ok((policy, key, ops))
            },
            move |(policy, key, ops)| {
                let mut captured = None;
                engine.operate(&policy, &key, &ops, &mut |record| {
                    captured = Some(clone_record(record))
                })?;
                captured.ok_or_else(|| BridgeError::client("engine returned no operate result"))
            },
            |record| Ok(HostRecord::from_record(&record)),
        );
    }

    /// Runs a batch of read/write/apply/remove entries in one round.
    /// Results come back in request order with per-entry statuses.
    pub fn batch(
        &self,
        policy: BatchPolicy,
        requests: Vec<BatchRecord>,
        callback: ResultCallback<Vec<HostBatchResult>>,
    ) {
        let Some(command) = self.command("batch", callback) else {
            return;
        };
        let engine = Arc::clone(&self.engine);
        self.bridge.submit(
            command,
            move |_| {
                for request in &requests {
                    validate_batch_entry(request)?;
                }
                Ok((policy, requests))
            },
            move |(policy, requests)| {
                let mut delivered: Vec<OwnedBatchResult> = Vec::with_capacity(requests.len());
                let overall = engine.batch(&policy, &requests, &mut |entries| {
                    delivered.extend(entries.iter().map(OwnedBatchResult::capture));
                });
                Ok(resolve_batch(overall, delivered))
            },
            |outcome| match outcome {
                BatchOutcome::Completed(entries) => {
                    Ok(entries.iter().map(HostBatchResult::from_owned).collect())
                }
                BatchOutcome::Failed(err) => Err(err),
            },
        );
    }

    /// Reads many keys in one round; convenience wrapper over
    /// [`Client::batch`].
    pub fn batch_read(
        &self,
        policy: BatchPolicy,
        keys: Vec<Key>,
        bins: Option<Vec<String>>,
        callback: ResultCallback<Vec<HostBatchResult>>,
    ) {
        let requests = keys
            .into_iter()
            .map(|key| BatchRecord::read(key, bins.clone()))
            .collect();
        self.batch(policy, requests, callback);
    }

    /// Streams every record of a namespace/set through `on_record` on the
    /// callback thread, ending with exactly one `on_end`. `on_record`
    /// returns `false` to stop early; buffered records are then discarded
    /// and only `on_end` follows.
    pub fn scan(
        &self,
        policy: ScanPolicy,
        namespace: String,
        set: Option<String>,
        on_record: impl FnMut(HostRecord) -> bool + Send + 'static,
        on_end: impl FnOnce(Option<CallbackError>) + Send + 'static,
    ) {
        self.stream("scan", on_record, on_end, move |engine, queue| {
            engine.scan(&policy, &namespace, set.as_deref(), &mut |record| {
                queue.push(HostRecord::from_record(record))
            })
        });
    }

    /// Streams records matching the statement. Same delivery contract as
    /// [`Client::scan`].
    pub fn query(
        &self,
        policy: QueryPolicy,
        statement: Statement,
        on_record: impl FnMut(HostRecord) -> bool + Send + 'static,
        on_end: impl FnOnce(Option<CallbackError>) + Send + 'static,
    ) {
        self.stream("query", on_record, on_end, move |engine, queue| {
            engine.query(&policy, &statement, &mut |record| {
                queue.push(HostRecord::from_record(record))
            })
        });
    }

    fn stream(
        &self,
        name: &'static str,
        mut on_record: impl FnMut(HostRecord) -> bool + Send + 'static,
        on_end: impl FnOnce(Option<CallbackError>) + Send + 'static,
        produce: impl FnOnce(&dyn NativeEngine, &Arc<StreamingQueue<HostRecord>>) -> Result<()>
            + Send
            + 'static,
    ) {
        if self.shared.is_closed() {
            let err = BridgeError::aborted("client is closed");
            on_end(Some(CallbackError::from(&err)));
            return;
        }
        if !self.pool.is_accepting() {
            let err = BridgeError::client("worker pool not accepting commands");
            on_end(Some(CallbackError::from(&err)));
            return;
        }

        let shared = Arc::clone(&self.shared);
        let mut on_end = Some(on_end);
        let consumer: StreamConsumer<HostRecord> = Box::new(move |item| {
            if shared.is_closed() {
                return false;
            }
            match item {
                StreamItem::Item(record) => on_record(record),
                StreamItem::End(err) => {
                    if let Some(on_end) = on_end.take() {
                        on_end(err.as_ref().map(CallbackError::from));
                    }
                    false
                }
            }
        });
        let queue = StreamingQueue::new(self.config.stream_capacity, self.handle(), consumer);

        let engine = Arc::clone(&self.engine);
        let worker_queue = Arc::clone(&queue);
        let submitted = self.pool.submit(move || {
            let result = produce(&*engine, &worker_queue);
            worker_queue.finish(result);
        });
        if let Err(err) = submitted {
            // A racing shutdown or full pool rejected the producer; the end
            // marker still reaches on_end through the queue.
            queue.finish(Err(BridgeError::client(format!(
                "{name} dispatch rejected: {err}"
            ))));
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

fn validate_bin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BridgeError::param("bin name must not be empty"));
    }
    if name.len() > MAX_BIN_NAME_BYTES {
        return Err(BridgeError::param(format!(
            "bin name {name:?} exceeds {MAX_BIN_NAME_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Prepare-phase validation of one batch entry's bin names.
fn validate_batch_entry(request: &BatchRecord) -> Result<()> {
    match request {
        BatchRecord::Read {
            bins: Some(selection),
            ..
        } => {
            for name in selection {
                validate_bin_name(name)?;
            }
        }
        BatchRecord::Write { ops, .. } => {
            for op in ops {
                if let Operation::Read(name)
                | Operation::Put(name, _)
                | Operation::Add(name, _)
                | Operation::Append(name, _)
                | Operation::Prepend(name, _) = op
                {
                    validate_bin_name(name)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Converts a host bins object to native pairs, rejecting anything that is
/// not an object and any bin holding an undefined value.
fn native_bins(bins: &HostValue) -> Result<Vec<(String, Value)>> {
    let HostValue::Object(fields) = bins else {
        return Err(BridgeError::param(format!(
            "bins must be an object, got {}",
            bins.type_name()
        )));
    };
    if fields.is_empty() {
        return Err(BridgeError::param("bins object must not be empty"));
    }
    fields
        .iter()
        .map(|(name, value)| {
            validate_bin_name(name)?;
            let native = to_native(value).map_err(|mut err| {
                err.message = format!("bin {name:?}: {}", err.message);
                err
            })?;
            Ok((name.clone(), native))
        })
        .collect()
}

/// Runs a single-record read, turning an engine `NotFound` into a success
/// that echoes the key with no record.
fn fetch_optional(
    engine: &dyn NativeEngine,
    policy: &ReadPolicy,
    key: Key,
    bins: Option<&[String]>,
) -> Result<HostReadResult> {
    let mut captured = None;
    let fetched = engine.get(policy, &key, bins, &mut |record| {
        captured = Some(HostRecord::from_record(record))
    });
    match fetched {
        Ok(()) => {
            let record = captured.ok_or_else(|| BridgeError::client("engine returned no record"))?;
            Ok(HostReadResult {
                key,
                record: Some(record),
            })
        }
        Err(err) if err.code == ErrorCode::NotFound => Ok(HostReadResult { key, record: None }),
        Err(err) => Err(err),
    }
}
