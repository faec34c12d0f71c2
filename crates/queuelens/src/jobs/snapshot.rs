use tracing::debug;

use crate::config::{
    DEFAULT_MAX_HISTORY, DEFAULT_QUEUE_NAME, DEFAULT_RESULT_KEY_PREFIX, DEFAULT_SCAN_COUNT,
};
use crate::jobs::decode::RecordDecoder;
use crate::jobs::model::{DashboardSnapshot, JobView};
use crate::store::{JobStore, StoreConnector, StoreError};

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// keys requested from the single scan pass
    pub scan_count: usize,
    /// rows returned at most
    pub max_history: usize,
    pub result_key_prefix: String,
    pub queue_name: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            scan_count: DEFAULT_SCAN_COUNT,
            max_history: DEFAULT_MAX_HISTORY,
            result_key_prefix: DEFAULT_RESULT_KEY_PREFIX.to_string(),
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
        }
    }
}

/// Builds a fresh [`DashboardSnapshot`] per call.
///
/// The job list is a best-effort recent window: one scan pass is made and
/// scan order has nothing to do with recency, so rows may be missing when
/// the store holds more results than `scan_count`.
pub struct SnapshotAssembler<C> {
    connector: C,
    decoder: RecordDecoder,
    cfg: SnapshotConfig,
}

impl<C: StoreConnector> SnapshotAssembler<C> {
    pub fn new(connector: C, cfg: SnapshotConfig) -> Self {
        let decoder = RecordDecoder::new(cfg.result_key_prefix.clone());
        Self {
            connector,
            decoder,
            cfg,
        }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.cfg
    }

    pub async fn pending_count(&self) -> Result<u64, StoreError> {
        let mut session = self.connector.open().await?;
        session.pending_count(&self.cfg.queue_name).await
    }

    pub async fn build_snapshot(&self) -> Result<DashboardSnapshot, StoreError> {
        // session lives until the end of this call, whichever way it exits
        let mut session = self.connector.open().await?;

        let queued_count = session.pending_count(&self.cfg.queue_name).await?;

        let mut keys = session
            .scan_keys(&self.cfg.result_key_prefix, self.cfg.scan_count)
            .await?;
        let scanned = keys.len();
        keys.truncate(self.cfg.max_history);

        let fetched = session.batch_get(&keys).await?;

        let mut jobs: Vec<JobView> = fetched
            .into_iter()
            .filter_map(|(key, value)| value.map(|blob| self.decoder.decode(&key, &blob)))
            .collect();

        sort_newest_first(&mut jobs);

        debug!(
            queued_count,
            scanned,
            returned = jobs.len(),
            "snapshot built"
        );

        Ok(DashboardSnapshot { queued_count, jobs })
    }
}

/// Newest start time first; rows without a start time go last.
/// Stable, so ties keep encounter order.
pub fn sort_newest_first(jobs: &mut [JobView]) {
    jobs.sort_by(|a, b| b.start_sort_key().cmp(&a.start_sort_key()));
}
