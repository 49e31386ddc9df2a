#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use kestrel::{
    CallbackError, Client, ClientConfig, HostReadResult, HostValue, Key, MemoryEngine,
    NativeEngine, ReadPolicy, Value, WritePolicy,
};

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::WARN)
        .try_init();
}

pub fn client() -> (Client, Arc<MemoryEngine>) {
    init_tracing();
    let engine = Arc::new(MemoryEngine::new());
    let client = Client::connect(
        ClientConfig::default(),
        Arc::clone(&engine) as Arc<dyn NativeEngine>,
    )
    .unwrap();
    (client, engine)
}

pub fn key(user: &str) -> Key {
    Key::new("test", Some("demo"), Value::from(user)).unwrap()
}

pub fn obj(fields: &[(&str, HostValue)]) -> HostValue {
    HostValue::Object(
        fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    )
}

/// Blocks on a put callback and unwraps the terminal outcome.
pub fn put_sync(
    client: &Client,
    policy: WritePolicy,
    key: Key,
    bins: HostValue,
) -> Result<Key, CallbackError> {
    let (tx, rx) = mpsc::channel();
    client.put(
        policy,
        key,
        bins,
        Box::new(move |err, key| {
            let _ = tx.send((err, key));
        }),
    );
    let (err, key) = rx.recv_timeout(TIMEOUT).expect("put callback never fired");
    match err {
        Some(err) => Err(err),
        None => Ok(key.expect("put callback carried neither error nor key")),
    }
}

/// Blocks on a get callback and unwraps the terminal outcome.
pub fn get_sync(client: &Client, key: Key) -> Result<HostReadResult, CallbackError> {
    let (tx, rx) = mpsc::channel();
    client.get(
        ReadPolicy::default(),
        key,
        Box::new(move |err, result| {
            let _ = tx.send((err, result));
        }),
    );
    let (err, result) = rx.recv_timeout(TIMEOUT).expect("get callback never fired");
    match err {
        Some(err) => Err(err),
        None => Ok(result.expect("get callback carried neither error nor result")),
    }
}

pub fn seed(client: &Client, user: &str, fields: &[(&str, HostValue)]) -> Key {
    let k = key(user);
    put_sync(
        client,
        WritePolicy::default(),
        kestrel::clone_key(&k),
        obj(fields),
    )
    .expect("seed put failed");
    k
}
