use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use super::{escape_glob, FetchedValue, JobStore, StoreConnector, StoreError};

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() || e.is_io_error() || e.is_timeout() {
            StoreError::Connect(e.to_string())
        } else {
            StoreError::Command(e.to_string())
        }
    }
}

#[derive(Clone)]
pub struct RedisConnector {
    client: redis::Client,
}

impl RedisConnector {
    pub fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl StoreConnector for RedisConnector {
    type Session = RedisSession;

    async fn open(&self) -> Result<RedisSession, StoreError> {
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(RedisSession { conn })
    }
}

/// A single connection, dropped at the end of the build that opened it.
pub struct RedisSession {
    conn: MultiplexedConnection,
}

#[async_trait]
impl JobStore for RedisSession {
    async fn pending_count(&mut self, queue: &str) -> Result<u64, StoreError> {
        // ZCARD on a missing key is 0
        let n: u64 = redis::cmd("ZCARD")
            .arg(queue)
            .query_async(&mut self.conn)
            .await?;
        Ok(n)
    }

    async fn scan_keys(
        &mut self,
        prefix: &str,
        max_count: usize,
    ) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{}*", escape_glob(prefix));

        // One pass from cursor 0; the returned cursor is deliberately ignored.
        let (_cursor, mut keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(0u64)
            .arg("MATCH")
            .arg(&pattern)
            .arg("COUNT")
            .arg(max_count)
            .query_async(&mut self.conn)
            .await?;

        // COUNT is only a hint to the server
        keys.truncate(max_count);
        Ok(keys)
    }

    async fn batch_get(&mut self, keys: &[String]) -> Result<Vec<FetchedValue>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut self.conn)
            .await?;

        if values.len() != keys.len() {
            return Err(StoreError::Command(format!(
                "MGET returned {} values for {} keys",
                values.len(),
                keys.len()
            )));
        }

        Ok(keys.iter().cloned().zip(values).collect())
    }
}
