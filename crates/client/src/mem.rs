//! In-memory reference engine.
//!
//! Implements the full [`NativeEngine`] contract against a process-local
//! map, including exists-action and generation semantics, so the bridge can
//! be exercised end to end without a server. Visitors are invoked with
//! references into engine-owned storage, matching the lifetime discipline a
//! wire-backed engine imposes.

use parking_lot::Mutex;
use std::collections::HashMap;

use kestrel_bridge::BatchResultRef;
use kestrel_convert::clone_record;
use kestrel_core::{
    BatchRecord, BridgeError, Digest, ErrorCode, Key, Operation, Record, Result, Value,
    TTL_DONT_UPDATE, TTL_NEVER_EXPIRE,
};

use crate::engine::{
    BatchVisitor, Filter, NativeEngine, RecordVisitor, Statement, StreamVisitor,
};
use crate::policy::{
    BatchPolicy, GenerationPolicy, QueryPolicy, ReadPolicy, RecordExistsAction, RemovePolicy,
    ScanPolicy, WritePolicy,
};

type StoreKey = (String, Digest);

/// Process-local storage engine.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    store: Mutex<HashMap<StoreKey, Record>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        MemoryEngine::default()
    }

    /// Number of stored records, across all namespaces.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}

fn store_key(key: &Key) -> Result<StoreKey> {
    let digest = key
        .digest
        .ok_or_else(|| BridgeError::param("key carries no digest"))?;
    Ok((key.namespace.clone(), digest))
}

fn check_generation(policy_gen: GenerationPolicy, expected: u32, stored: u32) -> Result<()> {
    let ok = match policy_gen {
        GenerationPolicy::None => true,
        GenerationPolicy::ExpectGenEqual => expected == stored,
        GenerationPolicy::ExpectGenGreater => expected > stored,
    };
    if ok {
        Ok(())
    } else {
        Err(BridgeError::new(
            ErrorCode::Generation,
            format!("generation check failed: stored {stored}, expected {expected}"),
        ))
    }
}

/// A record restricted to the named bins, preserving their stored order.
fn select_bins(record: &Record, bins: &[String]) -> Record {
    let mut out = clone_record(record);
    out.bins.retain(|(name, _)| bins.iter().any(|b| b == name));
    out
}

fn apply_operations(
    record: &mut Record,
    ops: &[Operation],
    ttl: u32,
) -> Result<(Vec<(String, Value)>, bool)> {
    let mut reads = Vec::new();
    let mut wrote = false;
    let mut deleted = false;

    for op in ops {
        match op {
            Operation::Read(bin) => {
                let value = record.bin(bin).cloned().unwrap_or(Value::Nil);
                reads.push((bin.clone(), value));
            }
            Operation::Put(bin, value) => {
                record.set_bin(bin.clone(), value.clone())?;
                wrote = true;
            }
            Operation::Add(bin, delta) => {
                let next = match record.bin(bin) {
                    None => *delta,
                    Some(Value::Int(current)) => current.wrapping_add(*delta),
                    Some(other) => {
                        return Err(BridgeError::param(format!(
                            "cannot add to {} bin {bin:?}",
                            other.type_name()
                        )))
                    }
                };
                record.set_bin(bin.clone(), Value::Int(next))?;
                wrote = true;
            }
            Operation::Append(bin, value) => {
                let next = concat(record.bin(bin), value, false)
                    .map_err(|e| e.rename_bin(bin))?;
                record.set_bin(bin.clone(), next)?;
                wrote = true;
            }
            Operation::Prepend(bin, value) => {
                let next = concat(record.bin(bin), value, true)
                    .map_err(|e| e.rename_bin(bin))?;
                record.set_bin(bin.clone(), next)?;
                wrote = true;
            }
            Operation::Touch => {
                wrote = true;
            }
            Operation::Delete => {
                record.bins.clear();
                deleted = true;
                wrote = true;
            }
        }
    }

    if wrote {
        record.generation = record.generation.wrapping_add(1);
        if ttl != TTL_DONT_UPDATE {
            record.ttl = ttl;
        }
    }
    Ok((reads, deleted))
}

trait RenameBin {
    fn rename_bin(self, bin: &str) -> BridgeError;
}

impl RenameBin for BridgeError {
    fn rename_bin(mut self, bin: &str) -> BridgeError {
        self.message = format!("bin {bin:?}: {}", self.message);
        self
    }
}

fn concat(current: Option<&Value>, suffix: &Value, prepend: bool) -> Result<Value> {
    match (current, suffix) {
        (None, v @ (Value::String(_) | Value::Bytes(_))) => Ok(v.clone()),
        (Some(Value::String(a)), Value::String(b)) => Ok(Value::String(if prepend {
            format!("{b}{a}")
        } else {
            format!("{a}{b}")
        })),
        (Some(Value::Bytes(a)), Value::Bytes(b)) => {
            let mut out = Vec::with_capacity(a.len() + b.len());
            if prepend {
                out.extend_from_slice(b);
                out.extend_from_slice(a);
            } else {
                out.extend_from_slice(a);
                out.extend_from_slice(b);
            }
            Ok(Value::Bytes(out))
        }
        (Some(other), _) => Err(BridgeError::param(format!(
            "cannot concatenate onto {} value",
            other.type_name()
        ))),
        (None, other) => Err(BridgeError::param(format!(
            "cannot concatenate {} value",
            other.type_name()
        ))),
    }
}

impl MemoryEngine {
    fn write_locked(
        store: &mut HashMap<StoreKey, Record>,
        policy: &WritePolicy,
        key: &Key,
        bins: &[(String, Value)],
    ) -> Result<()> {
        let map_key = store_key(key)?;
        let existing = store.get_mut(&map_key);

        match (&existing, policy.exists) {
            (Some(_), RecordExistsAction::CreateOnly) => {
                return Err(BridgeError::new(ErrorCode::KeyExists, "record already exists"))
            }
            (None, RecordExistsAction::UpdateOnly | RecordExistsAction::ReplaceOnly) => {
                return Err(BridgeError::not_found("record does not exist"))
            }
            _ => {}
        }

        match existing {
            Some(record) => {
                check_generation(policy.gen, policy.generation, record.generation)?;
                let replace = matches!(
                    policy.exists,
                    RecordExistsAction::Replace | RecordExistsAction::ReplaceOnly
                );
                if replace {
                    record.bins.clear();
                }
                for (name, value) in bins {
                    record.set_bin(name.clone(), value.clone())?;
                }
                record.generation = record.generation.wrapping_add(1);
                if policy.ttl != TTL_DONT_UPDATE {
                    record.ttl = policy.ttl;
                }
            }
            None => {
                let stored_key = if policy.send_key {
                    kestrel_convert::clone_key(key)
                } else {
                    Key::from_digest(key.namespace.clone(), key.set.as_deref(), map_key.1)?
                };
                let mut record = Record::new(stored_key);
                for (name, value) in bins {
                    record.set_bin(name.clone(), value.clone())?;
                }
                record.generation = 1;
                record.ttl = if policy.ttl == TTL_DONT_UPDATE {
                    TTL_NEVER_EXPIRE
                } else {
                    policy.ttl
                };
                store.insert(map_key, record);
            }
        }
        Ok(())
    }

    fn snapshot(&self, namespace: &str, set: Option<&str>) -> Vec<Record> {
        self.store
            .lock()
            .values()
            .filter(|r| r.key.namespace == namespace && r.key.set.as_deref() == set)
            .map(clone_record)
            .collect()
    }
}

impl NativeEngine for MemoryEngine {
    fn get(
        &self,
        _policy: &ReadPolicy,
        key: &Key,
        bins: Option<&[String]>,
        visit: RecordVisitor<'_>,
    ) -> Result<()> {
        let map_key = store_key(key)?;
        let store = self.store.lock();
        let record = store
            .get(&map_key)
            .ok_or_else(|| BridgeError::not_found("record not found"))?;
        match bins {
            Some(selection) => visit(&select_bins(record, selection)),
            None => visit(record),
        }
        Ok(())
    }

    fn exists(&self, _policy: &ReadPolicy, key: &Key) -> Result<bool> {
        let map_key = store_key(key)?;
        Ok(self.store.lock().contains_key(&map_key))
    }

    fn put(&self, policy: &WritePolicy, key: &Key, bins: &[(String, Value)]) -> Result<()> {
        let mut store = self.store.lock();
        Self::write_locked(&mut store, policy, key, bins)
    }

    fn remove(&self, policy: &RemovePolicy, key: &Key) -> Result<()> {
        let map_key = store_key(key)?;
        let mut store = self.store.lock();
        let record = store
            .get(&map_key)
            .ok_or_else(|| BridgeError::not_found("record not found"))?;
        check_generation(policy.gen, policy.generation, record.generation)?;
        store.remove(&map_key);
        Ok(())
    }

    fn operate(
        &self,
        policy: &WritePolicy,
        key: &Key,
        ops: &[Operation],
        visit: RecordVisitor<'_>,
    ) -> Result<()> {
        let map_key = store_key(key)?;
        let mut store = self.store.lock();

        let (mut record, existed) = match store.remove(&map_key) {
            Some(record) => (record, true),
            None => {
                let writes = ops.iter().any(|op| !matches!(op, Operation::Read(_)));
                if !writes {
                    return Err(BridgeError::not_found("record not found"));
                }
                let stored_key =
                    Key::from_digest(key.namespace.clone(), key.set.as_deref(), map_key.1)?;
                (Record::new(stored_key), false)
            }
        };
        if existed {
            if let Err(err) = check_generation(policy.gen, policy.generation, record.generation) {
                store.insert(map_key, record);
                return Err(err);
            }
        }

        match apply_operations(&mut record, ops, policy.ttl) {
            Ok((reads, deleted)) => {
                let mut result = Record::new(kestrel_convert::clone_key(&record.key));
                result.generation = record.generation;
                result.ttl = record.ttl;
                result.bins = reads;

                if !deleted {
                    store.insert(map_key, record);
                }
                visit(&result);
                Ok(())
            }
            Err(err) => {
                // Operations are all-or-nothing; restore the prior record.
                if existed {
                    store.insert(map_key, record);
                }
                Err(err)
            }
        }
    }

    fn batch(
        &self,
        _policy: &BatchPolicy,
        requests: &[BatchRecord],
        visit: BatchVisitor<'_>,
    ) -> Result<()> {
        let mut outcomes: Vec<(ErrorCode, Option<Record>)> = Vec::with_capacity(requests.len());

        for request in requests {
            let outcome = match request {
                BatchRecord::Read { key, bins, .. } => {
                    let mut found = None;
                    match self.get(
                        &ReadPolicy::default(),
                        key,
                        bins.as_deref(),
                        &mut |record| found = Some(clone_record(record)),
                    ) {
                        Ok(()) => (ErrorCode::Ok, found),
                        Err(err) => (err.code, None),
                    }
                }
                BatchRecord::Write { key, ops, .. } => {
                    let mut found = None;
                    match self.operate(&WritePolicy::default(), key, ops, &mut |record| {
                        found = Some(clone_record(record))
                    }) {
                        Ok(()) => (ErrorCode::Ok, found),
                        Err(err) => (err.code, None),
                    }
                }
                BatchRecord::Remove { key, .. } => {
                    match self.remove(&RemovePolicy::default(), key) {
                        Ok(()) => (ErrorCode::Ok, None),
                        Err(err) => (err.code, None),
                    }
                }
                // No UDF runtime here.
                BatchRecord::Apply { .. } => (ErrorCode::ClientError, None),
            };
            outcomes.push(outcome);
        }

        let entries: Vec<BatchResultRef<'_>> = requests
            .iter()
            .zip(&outcomes)
            .map(|(request, (status, record))| BatchResultRef {
                status: *status,
                key: request.key(),
                record: record.as_ref(),
            })
            .collect();
        visit(&entries);
        Ok(())
    }

    fn scan(
        &self,
        policy: &ScanPolicy,
        namespace: &str,
        set: Option<&str>,
        visit: StreamVisitor<'_>,
    ) -> Result<()> {
        let mut records = self.snapshot(namespace, set);
        if policy.max_records > 0 {
            records.truncate(policy.max_records as usize);
        }
        for mut record in records {
            if !policy.include_bin_data {
                record.bins.clear();
            }
            if !visit(&record) {
                break;
            }
        }
        Ok(())
    }

    fn query(
        &self,
        _policy: &QueryPolicy,
        statement: &Statement,
        visit: StreamVisitor<'_>,
    ) -> Result<()> {
        let records = self.snapshot(&statement.namespace, statement.set.as_deref());
        for record in records {
            let matches = match &statement.filter {
                None => true,
                Some(Filter::Equal(bin, value)) => record.bin(bin) == Some(value),
                Some(Filter::Range(bin, min, max)) => matches!(
                    record.bin(bin),
                    Some(Value::Int(n)) if min <= n && n <= max
                ),
            };
            if !matches {
                continue;
            }
            let keep_going = match &statement.bins {
                Some(selection) => visit(&select_bins(&record, selection)),
                None => visit(&record),
            };
            if !keep_going {
                break;
            }
        }
        Ok(())
    }

    fn close(&self) {
        self.store.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: i64) -> Key {
        Key::new("test", Some("demo"), Value::from(n)).unwrap()
    }

    fn bins(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }

    fn get_record(engine: &MemoryEngine, key: &Key) -> Result<Record> {
        let mut out = None;
        engine.get(&ReadPolicy::default(), key, None, &mut |record| {
            out = Some(clone_record(record))
        })?;
        out.ok_or_else(|| BridgeError::client("visitor not invoked"))
    }

    #[test]
    fn put_then_get_round_trips_bins() {
        let engine = MemoryEngine::new();
        let k = key(1);
        engine
            .put(
                &WritePolicy::default(),
                &k,
                &bins(&[("name", Value::from("ada")), ("age", Value::from(36_i64))]),
            )
            .unwrap();

        let record = get_record(&engine, &k).unwrap();
        assert_eq!(record.generation, 1);
        assert_eq!(record.bin("name"), Some(&Value::from("ada")));
        assert_eq!(record.bin("age"), Some(&Value::from(36_i64)));
    }

    #[test]
    fn get_missing_is_not_found() {
        let engine = MemoryEngine::new();
        let err = get_record(&engine, &key(404)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn same_user_key_in_two_namespaces_stays_separate() {
        let engine = MemoryEngine::new();
        let a = Key::new("ns-a", Some("s"), Value::from(1_i64)).unwrap();
        let b = Key::new("ns-b", Some("s"), Value::from(1_i64)).unwrap();
        engine
            .put(&WritePolicy::default(), &a, &bins(&[("n", Value::from("a"))]))
            .unwrap();
        engine
            .put(&WritePolicy::default(), &b, &bins(&[("n", Value::from("b"))]))
            .unwrap();

        assert_eq!(get_record(&engine, &a).unwrap().bin("n"), Some(&Value::from("a")));
        assert_eq!(get_record(&engine, &b).unwrap().bin("n"), Some(&Value::from("b")));
    }

    #[test]
    fn update_merges_and_replace_clears() {
        let engine = MemoryEngine::new();
        let k = key(2);
        engine
            .put(
                &WritePolicy::default(),
                &k,
                &bins(&[("a", Value::from(1_i64)), ("b", Value::from(2_i64))]),
            )
            .unwrap();
        engine
            .put(&WritePolicy::default(), &k, &bins(&[("b", Value::from(20_i64))]))
            .unwrap();

        let record = get_record(&engine, &k).unwrap();
        assert_eq!(record.bin("a"), Some(&Value::from(1_i64)));
        assert_eq!(record.bin("b"), Some(&Value::from(20_i64)));
        assert_eq!(record.generation, 2);

        let replace = WritePolicy {
            exists: RecordExistsAction::Replace,
            ..WritePolicy::default()
        };
        engine
            .put(&replace, &k, &bins(&[("c", Value::from(3_i64))]))
            .unwrap();
        let record = get_record(&engine, &k).unwrap();
        assert!(record.bin("a").is_none());
        assert_eq!(record.bin("c"), Some(&Value::from(3_i64)));
    }

    #[test]
    fn create_only_rejects_existing() {
        let engine = MemoryEngine::new();
        let k = key(3);
        let create = WritePolicy {
            exists: RecordExistsAction::CreateOnly,
            ..WritePolicy::default()
        };
        engine.put(&create, &k, &bins(&[("n", Value::from(1_i64))])).unwrap();
        let err = engine
            .put(&create, &k, &bins(&[("n", Value::from(2_i64))]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::KeyExists);
    }

    #[test]
    fn update_only_rejects_missing() {
        let engine = MemoryEngine::new();
        let update = WritePolicy {
            exists: RecordExistsAction::UpdateOnly,
            ..WritePolicy::default()
        };
        let err = engine
            .put(&update, &key(4), &bins(&[("n", Value::from(1_i64))]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn generation_check_gates_writes_and_removes() {
        let engine = MemoryEngine::new();
        let k = key(5);
        engine
            .put(&WritePolicy::default(), &k, &bins(&[("n", Value::from(1_i64))]))
            .unwrap();

        let stale = WritePolicy {
            gen: GenerationPolicy::ExpectGenEqual,
            generation: 9,
            ..WritePolicy::default()
        };
        let err = engine
            .put(&stale, &k, &bins(&[("n", Value::from(2_i64))]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Generation);

        let current = WritePolicy {
            gen: GenerationPolicy::ExpectGenEqual,
            generation: 1,
            ..WritePolicy::default()
        };
        engine
            .put(&current, &k, &bins(&[("n", Value::from(2_i64))]))
            .unwrap();

        let stale_remove = RemovePolicy {
            gen: GenerationPolicy::ExpectGenEqual,
            generation: 1,
            ..RemovePolicy::default()
        };
        let err = engine.remove(&stale_remove, &k).unwrap_err();
        assert_eq!(err.code, ErrorCode::Generation);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let engine = MemoryEngine::new();
        let err = engine.remove(&RemovePolicy::default(), &key(6)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn select_returns_only_named_bins() {
        let engine = MemoryEngine::new();
        let k = key(7);
        engine
            .put(
                &WritePolicy::default(),
                &k,
                &bins(&[
                    ("a", Value::from(1_i64)),
                    ("b", Value::from(2_i64)),
                    ("c", Value::from(3_i64)),
                ]),
            )
            .unwrap();

        let selection = vec!["c".to_string(), "a".to_string()];
        let mut seen = None;
        engine
            .get(&ReadPolicy::default(), &k, Some(&selection), &mut |record| {
                seen = Some(clone_record(record))
            })
            .unwrap();
        let record = seen.unwrap();
        assert_eq!(
            record.bins.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
    }

    #[test]
    fn operate_reads_and_writes_in_order() {
        let engine = MemoryEngine::new();
        let k = key(8);
        engine
            .put(
                &WritePolicy::default(),
                &k,
                &bins(&[("count", Value::from(10_i64)), ("tag", Value::from("v"))]),
            )
            .unwrap();

        let ops = vec![
            Operation::Add("count".to_string(), 5),
            Operation::Append("tag".to_string(), Value::from("1")),
            Operation::Read("count".to_string()),
            Operation::Read("tag".to_string()),
        ];
        let mut seen = None;
        engine
            .operate(&WritePolicy::default(), &k, &ops, &mut |record| {
                seen = Some(clone_record(record))
            })
            .unwrap();

        let result = seen.unwrap();
        assert_eq!(result.bin("count"), Some(&Value::from(15_i64)));
        assert_eq!(result.bin("tag"), Some(&Value::from("v1")));
        assert_eq!(result.generation, 2);
    }

    #[test]
    fn operate_read_only_on_missing_record_is_not_found() {
        let engine = MemoryEngine::new();
        let ops = vec![Operation::Read("n".to_string())];
        let err = engine
            .operate(&WritePolicy::default(), &key(9), &ops, &mut |_| {})
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn operate_add_on_string_bin_fails_without_side_effects() {
        let engine = MemoryEngine::new();
        let k = key(10);
        engine
            .put(
                &WritePolicy::default(),
                &k,
                &bins(&[("a", Value::from(1_i64)), ("s", Value::from("x"))]),
            )
            .unwrap();

        let ops = vec![
            Operation::Put("a".to_string(), Value::from(99_i64)),
            Operation::Add("s".to_string(), 1),
        ];
        let err = engine
            .operate(&WritePolicy::default(), &k, &ops, &mut |_| {})
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ParamError);

        // The earlier Put in the failed operation list must not stick.
        let record = get_record(&engine, &k).unwrap();
        assert_eq!(record.bin("a"), Some(&Value::from(1_i64)));
        assert_eq!(record.generation, 1);
    }

    #[test]
    fn operate_delete_expunges_the_record() {
        let engine = MemoryEngine::new();
        let k = key(11);
        engine
            .put(&WritePolicy::default(), &k, &bins(&[("n", Value::from(1_i64))]))
            .unwrap();

        engine
            .operate(&WritePolicy::default(), &k, &[Operation::Delete], &mut |_| {})
            .unwrap();
        assert_eq!(
            get_record(&engine, &k).unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[test]
    fn batch_preserves_request_order_and_per_entry_status() {
        let engine = MemoryEngine::new();
        let keys = [key(20), key(21), key(22)];
        for k in [&keys[0], &keys[2]] {
            engine
                .put(&WritePolicy::default(), k, &bins(&[("n", Value::from(1_i64))]))
                .unwrap();
        }

        let requests: Vec<BatchRecord> = keys
            .iter()
            .map(|k| BatchRecord::read(kestrel_convert::clone_key(k), None))
            .collect();

        let mut statuses = Vec::new();
        engine
            .batch(&BatchPolicy::default(), &requests, &mut |entries| {
                statuses = entries
                    .iter()
                    .map(|e| (e.status, e.record.is_some()))
                    .collect();
            })
            .unwrap();

        assert_eq!(
            statuses,
            vec![
                (ErrorCode::Ok, true),
                (ErrorCode::NotFound, false),
                (ErrorCode::Ok, true),
            ]
        );
    }

    #[test]
    fn scan_honors_early_stop_and_max_records() {
        let engine = MemoryEngine::new();
        for i in 0..10 {
            engine
                .put(&WritePolicy::default(), &key(i), &bins(&[("n", Value::from(i))]))
                .unwrap();
        }

        let mut count = 0;
        engine
            .scan(&ScanPolicy::default(), "test", Some("demo"), &mut |_| {
                count += 1;
                count < 3
            })
            .unwrap();
        assert_eq!(count, 3);

        let capped = ScanPolicy {
            max_records: 5,
            ..ScanPolicy::default()
        };
        let mut count = 0;
        engine
            .scan(&capped, "test", Some("demo"), &mut |_| {
                count += 1;
                true
            })
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn query_filters_on_equality_and_range() {
        let engine = MemoryEngine::new();
        for i in 0..10 {
            engine
                .put(&WritePolicy::default(), &key(i), &bins(&[("n", Value::from(i))]))
                .unwrap();
        }

        let mut statement = Statement::new("test", Some("demo"));
        statement.filter = Some(Filter::Range("n".to_string(), 3, 6));
        let mut seen = Vec::new();
        engine
            .query(&QueryPolicy::default(), &statement, &mut |record| {
                if let Some(Value::Int(n)) = record.bin("n") {
                    seen.push(*n);
                }
                true
            })
            .unwrap();
        seen.sort_unstable();
        assert_eq!(seen, vec![3, 4, 5, 6]);

        statement.filter = Some(Filter::Equal("n".to_string(), Value::from(7_i64)));
        let mut seen = Vec::new();
        engine
            .query(&QueryPolicy::default(), &statement, &mut |record| {
                seen.push(record.bin("n").cloned());
                true
            })
            .unwrap();
        assert_eq!(seen, vec![Some(Value::from(7_i64))]);
    }
}
