//! Turns one stored blob into a [`JobView`].
//!
//! Decoding never fails outward. A blob that cannot be read still yields a
//! row (function `Unknown/DecodeError`, status `failed`) so one bad record
//! cannot take down the whole snapshot.

use serde_json::Value;
use tracing::warn;

use crate::jobs::model::{JobStatus, JobView, RawJobRecord};
use crate::jobs::timestamp::{self, ABSENT};

pub const PAYLOAD_VERSION: u64 = 1;
pub const DECODE_ERROR_FUNCTION: &str = "Unknown/DecodeError";
pub const DECODE_ERROR_LABEL: &str = "Payload Decode Error";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u64),
}

pub fn parse_record(blob: &[u8]) -> Result<RawJobRecord, DecodeError> {
    let value: Value = serde_json::from_slice(blob)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }

    let record: RawJobRecord = serde_json::from_value(value)?;
    match record.version {
        None | Some(PAYLOAD_VERSION) => Ok(record),
        Some(v) => Err(DecodeError::UnsupportedVersion(v)),
    }
}

#[derive(Debug, Clone)]
pub struct RecordDecoder {
    result_key_prefix: String,
}

impl RecordDecoder {
    pub fn new(result_key_prefix: impl Into<String>) -> Self {
        Self {
            result_key_prefix: result_key_prefix.into(),
        }
    }

    pub fn decode(&self, key: &str, blob: &[u8]) -> JobView {
        match parse_record(blob) {
            Ok(record) => self.build_view(key, record),
            Err(e) => {
                warn!(key, error = %e, "failed to decode job record");
                fallback_view(key, &e)
            }
        }
    }

    fn job_id_from_key<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.result_key_prefix.as_str())
            .unwrap_or(key)
    }

    fn build_view(&self, key: &str, record: RawJobRecord) -> JobView {
        let success = record.success.unwrap_or(false);
        let status = if success {
            JobStatus::Complete
        } else {
            JobStatus::Failed
        };

        let job_id = record
            .id
            .unwrap_or_else(|| self.job_id_from_key(key).to_string());

        let args = format!(
            "{} {}",
            render(record.args.as_ref()),
            render(record.kwargs.as_ref())
        );

        let result = if success {
            render(record.result.as_ref())
        } else {
            render(record.error.as_ref())
        };

        JobView {
            job_id,
            function: record.function.unwrap_or_else(|| ABSENT.to_string()),
            status,
            success,
            args,
            result,
            start_time: Some(timestamp::display(record.start_time.as_ref())),
            finish_time: Some(timestamp::display(record.finish_time.as_ref())),
            duration: Some(timestamp::duration(
                record.start_time.as_ref(),
                record.finish_time.as_ref(),
            )),
            enqueue_time: Some(timestamp::display(record.enqueue_time.as_ref())),
        }
    }
}

fn fallback_view(key: &str, err: &DecodeError) -> JobView {
    JobView {
        job_id: key.to_string(),
        function: DECODE_ERROR_FUNCTION.to_string(),
        status: JobStatus::Failed,
        success: false,
        args: ABSENT.to_string(),
        result: format!("{DECODE_ERROR_LABEL}: {err}"),
        start_time: None,
        finish_time: None,
        duration: None,
        enqueue_time: None,
    }
}

/// Strings bare, missing as `None`, everything else as compact JSON.
fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
