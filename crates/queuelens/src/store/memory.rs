//! In-process store with the same read semantics as the Redis session.
//! Used by tests and handy for running the dashboard without a Redis.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{FetchedValue, JobStore, StoreConnector, StoreError};

#[derive(Default)]
struct Inner {
    pending: HashMap<String, u64>,
    // insertion order stands in for scan order
    entries: Vec<(String, Option<Vec<u8>>)>,
    unreachable: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_pending(&self, queue: &str, count: u64) {
        self.lock().pending.insert(queue.to_string(), count);
    }

    /// Stores `value` under `key`, replacing any earlier value in place.
    pub fn put(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.upsert(key, Some(value.into()));
    }

    /// Registers a key that scans can see but whose value is already gone,
    /// the way a result expires between SCAN and MGET.
    pub fn put_expired(&self, key: &str) {
        self.upsert(key, None);
    }

    /// Makes every subsequent `open` fail like an unreachable server.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    fn upsert(&self, key: &str, value: Option<Vec<u8>>) {
        let mut inner = self.lock();
        match inner.entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => inner.entries.push((key.to_string(), value)),
        }
    }
}

#[async_trait]
impl StoreConnector for MemoryStore {
    type Session = MemorySession;

    async fn open(&self) -> Result<MemorySession, StoreError> {
        if self.lock().unreachable {
            return Err(StoreError::Connect("memory store marked unreachable".into()));
        }
        Ok(MemorySession {
            store: self.clone(),
        })
    }
}

pub struct MemorySession {
    store: MemoryStore,
}

#[async_trait]
impl JobStore for MemorySession {
    async fn pending_count(&mut self, queue: &str) -> Result<u64, StoreError> {
        Ok(self.store.lock().pending.get(queue).copied().unwrap_or(0))
    }

    async fn scan_keys(
        &mut self,
        prefix: &str,
        max_count: usize,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .store
            .lock()
            .entries
            .iter()
            .map(|(k, _)| k)
            .filter(|k| k.starts_with(prefix))
            .take(max_count)
            .cloned()
            .collect())
    }

    async fn batch_get(&mut self, keys: &[String]) -> Result<Vec<FetchedValue>, StoreError> {
        let inner = self.store.lock();
        Ok(keys
            .iter()
            .map(|key| {
                let value = inner
                    .entries
                    .iter()
                    .find(|(k, _)| k == key)
                    .and_then(|(_, v)| v.clone());
                (key.clone(), value)
            })
            .collect())
    }
}
