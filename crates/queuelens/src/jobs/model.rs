use serde::Serialize;
use serde_json::Value;

use crate::jobs::timestamp::{self, RawTimestamp, ABSENT};

/// One stored result record, as written by the job runner.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RawJobRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "f")]
    pub function: Option<String>,
    #[serde(default, rename = "s")]
    pub success: Option<bool>,
    #[serde(default, rename = "a")]
    pub args: Option<Value>,
    #[serde(default, rename = "k")]
    pub kwargs: Option<Value>,
    #[serde(default, rename = "r")]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default, rename = "et", deserialize_with = "timestamp::lenient")]
    pub enqueue_time: Option<RawTimestamp>,
    #[serde(default, rename = "st", deserialize_with = "timestamp::lenient")]
    pub start_time: Option<RawTimestamp>,
    #[serde(default, rename = "ft", deserialize_with = "timestamp::lenient")]
    pub finish_time: Option<RawTimestamp>,
    #[serde(default, rename = "v")]
    pub version: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Complete,
    Failed,
}

/// Display-ready row. Timestamps and duration are `None` only on rows
/// synthesized for records that could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub job_id: String,
    pub function: String,
    pub status: JobStatus,
    pub success: bool,
    pub args: String,
    pub result: String,
    pub start_time: Option<String>,
    pub finish_time: Option<String>,
    pub duration: Option<String>,
    pub enqueue_time: Option<String>,
}

impl JobView {
    /// Start time for ordering; `-` and `None` both count as missing.
    pub fn start_sort_key(&self) -> Option<&str> {
        self.start_time.as_deref().filter(|s| *s != ABSENT)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub queued_count: u64,
    pub jobs: Vec<JobView>,
}
