//! Timestamps as the job runner stores them.
//!
//! Older runner versions wrote epoch milliseconds, newer ones write an
//! instant. Both generations coexist in a live store, so every helper here
//! accepts either form, and none of them fail outward: unusable values
//! become `None` or a sentinel string.

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const ABSENT: &str = "-";
pub const DURATION_NA: &str = "N/A";
pub const DURATION_ERROR: &str = "Error";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    EpochMillis(f64),
    Instant(DateTime<FixedOffset>),
}

#[derive(Debug, thiserror::Error)]
pub enum DurationError {
    #[error("elapsed time is not a finite number")]
    NonFinite,
    #[error("elapsed time out of range")]
    OutOfRange,
}

impl RawTimestamp {
    /// Numbers are epoch millis, strings are RFC 3339 instants, anything
    /// else is treated as missing.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(RawTimestamp::EpochMillis),
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(RawTimestamp::Instant),
            _ => None,
        }
    }

    fn epoch_seconds(&self) -> f64 {
        match self {
            RawTimestamp::EpochMillis(ms) => ms / 1000.0,
            RawTimestamp::Instant(dt) => {
                dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9
            }
        }
    }
}

/// serde helper: a timestamp field that never fails the surrounding record.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<RawTimestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(RawTimestamp::from_value))
}

/// Converts to an instant in the local zone.
pub fn to_instant(raw: &RawTimestamp) -> Option<DateTime<Local>> {
    match raw {
        RawTimestamp::EpochMillis(ms) => {
            if !ms.is_finite() {
                return None;
            }
            let millis = ms.round();
            if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
                return None;
            }
            DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.with_timezone(&Local))
        }
        RawTimestamp::Instant(dt) => Some(dt.with_timezone(&Local)),
    }
}

pub fn format_instant<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    instant.format(DISPLAY_FORMAT).to_string()
}

/// Display form of an optional raw timestamp, `-` when missing or unusable.
pub fn display(raw: Option<&RawTimestamp>) -> String {
    raw.and_then(to_instant)
        .map(|dt| format_instant(&dt))
        .unwrap_or_else(|| ABSENT.to_string())
}

/// Seconds from `start` to `finish`, in any mix of representations.
pub fn elapsed_seconds(start: &RawTimestamp, finish: &RawTimestamp) -> Result<f64, DurationError> {
    let secs = match (start, finish) {
        (RawTimestamp::EpochMillis(s), RawTimestamp::EpochMillis(f)) => (f - s) / 1000.0,
        (RawTimestamp::Instant(s), RawTimestamp::Instant(f)) => {
            let micros = (*f - *s)
                .num_microseconds()
                .ok_or(DurationError::OutOfRange)?;
            micros as f64 / 1e6
        }
        (s, f) => f.epoch_seconds() - s.epoch_seconds(),
    };

    if !secs.is_finite() {
        return Err(DurationError::NonFinite);
    }
    Ok(secs)
}

/// `"5.00s"` style elapsed time, `N/A` if either bound is missing,
/// `Error` if it cannot be computed.
pub fn duration(start: Option<&RawTimestamp>, finish: Option<&RawTimestamp>) -> String {
    let (Some(start), Some(finish)) = (start, finish) else {
        return DURATION_NA.to_string();
    };

    match elapsed_seconds(start, finish) {
        Ok(secs) => format!("{secs:.2}s"),
        Err(e) => {
            tracing::warn!(error = %e, "duration calculation failed");
            DURATION_ERROR.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn instant_from_millis(ms: i64) -> RawTimestamp {
        let dt = Utc.timestamp_millis_opt(ms).unwrap();
        RawTimestamp::Instant(dt.fixed_offset())
    }

    #[test]
    fn numbers_are_epoch_millis() {
        let raw = RawTimestamp::from_value(&json!(1_700_000_000_000i64)).unwrap();
        let dt = to_instant(&raw).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn strings_parse_as_instants() {
        let raw = RawTimestamp::from_value(&json!("2023-11-14T22:13:20Z")).unwrap();
        assert_eq!(to_instant(&raw).unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn other_shapes_are_absent() {
        assert_eq!(RawTimestamp::from_value(&json!(true)), None);
        assert_eq!(RawTimestamp::from_value(&json!("yesterday")), None);
        assert_eq!(RawTimestamp::from_value(&json!([1, 2])), None);
        assert_eq!(RawTimestamp::from_value(&Value::Null), None);
    }

    #[test]
    fn non_finite_millis_have_no_instant() {
        assert!(to_instant(&RawTimestamp::EpochMillis(f64::NAN)).is_none());
        assert!(to_instant(&RawTimestamp::EpochMillis(f64::INFINITY)).is_none());
        assert!(to_instant(&RawTimestamp::EpochMillis(1e300)).is_none());
    }

    #[test]
    fn format_is_fixed_width() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_instant(&dt), "2024-03-09 07:05:01");
    }

    #[test]
    fn display_uses_local_zone() {
        let raw = RawTimestamp::EpochMillis(1_700_000_000_000.0);
        let expected = Local
            .timestamp_opt(1_700_000_000, 0)
            .unwrap()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(display(Some(&raw)), expected);
    }

    #[test]
    fn display_missing_is_dash() {
        assert_eq!(display(None), "-");
    }

    #[test]
    fn duration_missing_bound_is_na() {
        let t = RawTimestamp::EpochMillis(1_000.0);
        assert_eq!(duration(None, Some(&t)), "N/A");
        assert_eq!(duration(Some(&t), None), "N/A");
        assert_eq!(duration(None, None), "N/A");
    }

    #[test]
    fn duration_from_millis() {
        let st = RawTimestamp::EpochMillis(1_700_000_000_000.0);
        let ft = RawTimestamp::EpochMillis(1_700_000_005_000.0);
        assert_eq!(duration(Some(&st), Some(&ft)), "5.00s");
    }

    #[test]
    fn duration_is_representation_invariant() {
        let (s, f) = (1_700_000_000_000i64, 1_700_000_003_257i64);
        let millis = duration(
            Some(&RawTimestamp::EpochMillis(s as f64)),
            Some(&RawTimestamp::EpochMillis(f as f64)),
        );
        let instants = duration(Some(&instant_from_millis(s)), Some(&instant_from_millis(f)));
        let mixed_a = duration(
            Some(&RawTimestamp::EpochMillis(s as f64)),
            Some(&instant_from_millis(f)),
        );
        let mixed_b = duration(
            Some(&instant_from_millis(s)),
            Some(&RawTimestamp::EpochMillis(f as f64)),
        );

        assert_eq!(millis, "3.26s");
        assert_eq!(instants, millis);
        assert_eq!(mixed_a, millis);
        assert_eq!(mixed_b, millis);
    }

    #[test]
    fn duration_non_finite_is_error() {
        let st = RawTimestamp::EpochMillis(f64::NAN);
        let ft = RawTimestamp::EpochMillis(1_000.0);
        assert_eq!(duration(Some(&st), Some(&ft)), "Error");
    }

    #[test]
    fn lenient_field_swallows_bad_types() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient")]
            st: Option<RawTimestamp>,
        }

        let row: Row = serde_json::from_value(json!({ "st": { "nested": 1 } })).unwrap();
        assert!(row.st.is_none());

        let row: Row = serde_json::from_value(json!({ "st": 5 })).unwrap();
        assert_eq!(row.st, Some(RawTimestamp::EpochMillis(5.0)));

        let row: Row = serde_json::from_value(json!({})).unwrap();
        assert!(row.st.is_none());
    }
}
