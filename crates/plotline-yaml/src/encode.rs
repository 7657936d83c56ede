//! Record → YAML encoding.
//!
//! Guarantees:
//!
//! - The stamp key (`time` or `span`) is always the first key of the
//!   mapping; data keys follow in sorted order.
//! - Deterministic: the same record always encodes to the same bytes.
//! - Fragments (single-element sequences) concatenate into one valid
//!   YAML sequence, making append-mode persistence trivial.

use chrono::{DateTime, SecondsFormat};
use plotline_core::{Record, Stamp, Timestamp, Value};

use crate::{SPAN_KEY, TIME_KEY};

/// How timestamps are rendered on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// Real seconds, e.g. `1.33`.
    #[default]
    Seconds,
    /// RFC3339/ISO8601 strings in UTC, e.g. `1970-01-01T00:00:01.330Z`.
    Iso8601,
}

impl TimeFormat {
    /// Normalize a configuration string (`output.timestamps`).
    ///
    /// # Errors
    ///
    /// [`EncodeError::UnknownTimeFormat`] for anything but the documented
    /// values (case-insensitive).
    pub fn from_config(raw: &str) -> Result<Self, EncodeError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "seconds" => Ok(Self::Seconds),
            "iso8601" | "rfc3339" => Ok(Self::Iso8601),
            _ => Err(EncodeError::UnknownTimeFormat(raw.to_string())),
        }
    }
}

/// Errors that can occur while encoding records.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A timestamp cannot be represented in the requested format
    /// (non-finite, or outside the ISO8601 calendar range).
    #[error("timestamp {0} is not representable in the requested time format")]
    UnrepresentableTime(Timestamp),

    /// An unrecognized `output.timestamps` configuration value.
    #[error("unknown time format {0:?} (expected \"seconds\" or \"iso8601\")")]
    UnknownTimeFormat(String),

    /// YAML serialization failed.
    #[error("failed to serialize record to YAML: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Encode a whole series as one YAML block sequence.
///
/// # Errors
///
/// See [`EncodeError`].
pub fn encode_series(records: &[Record], format: TimeFormat) -> Result<String, EncodeError> {
    let mappings = records
        .iter()
        .map(|record| record_to_mapping(record, format))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_yaml::to_string(&mappings)?)
}

/// Encode one record as a single-element sequence fragment.
///
/// Concatenating fragments yields a valid series document.
///
/// # Errors
///
/// See [`EncodeError`].
pub fn encode_fragment(record: &Record, format: TimeFormat) -> Result<String, EncodeError> {
    encode_series(std::slice::from_ref(record), format)
}

fn record_to_mapping(
    record: &Record,
    format: TimeFormat,
) -> Result<serde_yaml::Mapping, EncodeError> {
    let mut mapping = serde_yaml::Mapping::new();

    // Stamp first, always.
    match record.stamp {
        Stamp::Time(t) => {
            mapping.insert(TIME_KEY.into(), stamp_value(t, format)?);
        }
        Stamp::Span(start, end) => {
            let span = serde_yaml::Value::Sequence(vec![
                stamp_value(start, format)?,
                stamp_value(end, format)?,
            ]);
            mapping.insert(SPAN_KEY.into(), span);
        }
    }

    // Data keys follow in the record's (sorted) order.
    for (key, value) in &record.fields {
        mapping.insert(key.as_str().into(), value_to_yaml(value));
    }

    Ok(mapping)
}

fn stamp_value(t: Timestamp, format: TimeFormat) -> Result<serde_yaml::Value, EncodeError> {
    if !t.is_finite() {
        return Err(EncodeError::UnrepresentableTime(t));
    }

    match format {
        TimeFormat::Seconds => Ok(serde_yaml::Value::Number(t.into())),
        TimeFormat::Iso8601 => {
            let micros = (t * 1e6).round() as i64;
            let datetime = DateTime::from_timestamp_micros(micros)
                .ok_or(EncodeError::UnrepresentableTime(t))?;
            Ok(serde_yaml::Value::String(
                datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
            ))
        }
    }
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(v) => serde_yaml::Value::Bool(*v),
        Value::Int(v) => serde_yaml::Value::Number((*v).into()),
        Value::Float(v) => serde_yaml::Value::Number((*v).into()),
        Value::Str(v) => serde_yaml::Value::String(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_key_comes_first_then_sorted_data_keys() {
        let record = Record::at(1.33).with("zeta", 2.0).with("alpha", 1.3);
        let yaml = encode_fragment(&record, TimeFormat::Seconds).expect("encode");
        assert_eq!(yaml, "- time: 1.33\n  alpha: 1.3\n  zeta: 2.0\n");
    }

    #[test]
    fn keepalive_encodes_as_stamp_only_mapping() {
        let record = Record::at(0.0);
        let yaml = encode_fragment(&record, TimeFormat::Seconds).expect("encode");
        assert_eq!(yaml, "- time: 0.0\n");
    }

    #[test]
    fn fragments_concatenate_into_a_series() {
        let a = encode_fragment(&Record::at(0.0).with("a", 1.0), TimeFormat::Seconds)
            .expect("encode");
        let b = encode_fragment(&Record::at(1.0).with("a", 2.0), TimeFormat::Seconds)
            .expect("encode");
        let both = encode_series(
            &[Record::at(0.0).with("a", 1.0), Record::at(1.0).with("a", 2.0)],
            TimeFormat::Seconds,
        )
        .expect("encode");
        assert_eq!(format!("{a}{b}"), both);
    }

    #[test]
    fn iso8601_renders_utc_with_millis() {
        let record = Record::at(1.33).with("a", 1.3);
        let yaml = encode_fragment(&record, TimeFormat::Iso8601).expect("encode");
        assert_eq!(yaml, "- time: 1970-01-01T00:00:01.330Z\n  a: 1.3\n");
    }

    #[test]
    fn non_finite_time_is_rejected() {
        let record = Record::at(f64::NEG_INFINITY);
        let err = encode_fragment(&record, TimeFormat::Seconds).expect_err("must fail");
        assert!(matches!(err, EncodeError::UnrepresentableTime(_)));
    }

    #[test]
    fn config_strings_normalize_case_insensitively() {
        assert_eq!(TimeFormat::from_config("Seconds").expect("ok"), TimeFormat::Seconds);
        assert_eq!(TimeFormat::from_config("ISO8601").expect("ok"), TimeFormat::Iso8601);
        assert_eq!(TimeFormat::from_config("rfc3339").expect("ok"), TimeFormat::Iso8601);
        assert!(TimeFormat::from_config("stardate").is_err());
    }
}
