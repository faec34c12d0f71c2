//! Read-only access to the key-value store the job runner writes into.
//!
//! A [`StoreConnector`] hands out one [`JobStore`] session per snapshot
//! build. Sessions are released when dropped, so every exit path of a
//! build (success, decode trouble, store failure) gives the connection back.

use async_trait::async_trait;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::{RedisConnector, RedisSession};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("command failed: {0}")]
    Command(String),
}

/// One fetched key and its value; `None` when the key vanished
/// between scan and fetch.
pub type FetchedValue = (String, Option<Vec<u8>>);

#[async_trait]
pub trait JobStore: Send {
    /// Number of jobs waiting in `queue` that have not started yet.
    async fn pending_count(&mut self, queue: &str) -> Result<u64, StoreError>;

    /// Up to `max_count` keys starting with `prefix`, from a single scan pass.
    /// Order says nothing about recency.
    async fn scan_keys(&mut self, prefix: &str, max_count: usize)
        -> Result<Vec<String>, StoreError>;

    /// Values for `keys` in one round trip, in the same order as `keys`.
    async fn batch_get(&mut self, keys: &[String]) -> Result<Vec<FetchedValue>, StoreError>;
}

#[async_trait]
pub trait StoreConnector: Send + Sync {
    type Session: JobStore;

    async fn open(&self) -> Result<Self::Session, StoreError>;
}

/// Escapes glob metacharacters so `prefix` matches literally in a SCAN MATCH.
pub fn escape_glob(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + 2);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_glob_leaves_plain_prefix_alone() {
        assert_eq!(escape_glob("arq:result:"), "arq:result:");
    }

    #[test]
    fn escape_glob_escapes_metacharacters() {
        assert_eq!(escape_glob("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\");
    }
}
