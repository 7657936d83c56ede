//! YAML → record decoding.
//!
//! Accepts the flat series form: a YAML sequence of mappings, each with
//! exactly one of `time`/`span` and free-form scalar data keys. Timestamps
//! may be real seconds or ISO8601/RFC3339 strings; both normalize to
//! seconds.

use chrono::DateTime;
use plotline_core::{Record, Stamp, Timestamp, Value};

use crate::{SPAN_KEY, TIME_KEY};

/// Errors reported while decoding a series.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The document is not valid YAML, or not a sequence of mappings.
    #[error("invalid series document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The top-level YAML node is not a sequence.
    #[error("series must be a YAML sequence of mappings")]
    NotASequence,

    /// A sequence element is not a mapping.
    #[error("record {index} is not a mapping")]
    NotAMapping { index: usize },

    /// A record carries neither `time` nor `span`.
    #[error("record {index} has no time or span key")]
    MissingStamp { index: usize },

    /// A record carries both `time` and `span`.
    #[error("record {index} has both time and span keys")]
    ConflictingStamp { index: usize },

    /// A timestamp is neither a number nor a parsable ISO8601 string.
    #[error("record {index}: unparsable timestamp {raw:?}")]
    BadTimestamp { index: usize, raw: String },

    /// A `span` is not a two-element array of timestamps.
    #[error("record {index}: span must be a two-element array")]
    BadSpan { index: usize },

    /// A data value is not a scalar.
    #[error("record {index}: key {key:?} has a non-scalar value")]
    NonScalarValue { index: usize, key: String },

    /// A data key is not a string.
    #[error("record {index}: non-string key")]
    NonStringKey { index: usize },
}

/// Decode a full series document.
///
/// # Errors
///
/// See [`DecodeError`].
pub fn decode_series(document: &str) -> Result<Vec<Record>, DecodeError> {
    if document.trim().is_empty() {
        return Ok(Vec::new());
    }

    let root: serde_yaml::Value = serde_yaml::from_str(document)?;
    let serde_yaml::Value::Sequence(elements) = root else {
        return Err(DecodeError::NotASequence);
    };

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| decode_record(index, element))
        .collect()
}

fn decode_record(index: usize, element: &serde_yaml::Value) -> Result<Record, DecodeError> {
    let serde_yaml::Value::Mapping(mapping) = element else {
        return Err(DecodeError::NotAMapping { index });
    };

    let time = mapping.get(TIME_KEY);
    let span = mapping.get(SPAN_KEY);

    let stamp = match (time, span) {
        (Some(_), Some(_)) => return Err(DecodeError::ConflictingStamp { index }),
        (None, None) => return Err(DecodeError::MissingStamp { index }),
        (Some(t), None) => Stamp::Time(parse_timestamp(index, t)?),
        (None, Some(s)) => {
            let serde_yaml::Value::Sequence(bounds) = s else {
                return Err(DecodeError::BadSpan { index });
            };
            let [start, end] = bounds.as_slice() else {
                return Err(DecodeError::BadSpan { index });
            };
            Stamp::Span(parse_timestamp(index, start)?, parse_timestamp(index, end)?)
        }
    };

    let mut record = Record {
        stamp,
        fields: std::collections::BTreeMap::new(),
    };

    for (key, value) in mapping {
        let serde_yaml::Value::String(key) = key else {
            return Err(DecodeError::NonStringKey { index });
        };
        if key == TIME_KEY || key == SPAN_KEY {
            continue;
        }
        record
            .fields
            .insert(key.clone(), yaml_to_value(index, key, value)?);
    }

    Ok(record)
}

fn parse_timestamp(index: usize, value: &serde_yaml::Value) -> Result<Timestamp, DecodeError> {
    match value {
        serde_yaml::Value::Number(n) => n.as_f64().ok_or_else(|| DecodeError::BadTimestamp {
            index,
            raw: n.to_string(),
        }),
        serde_yaml::Value::String(raw) => parse_iso8601(raw).ok_or_else(|| {
            DecodeError::BadTimestamp {
                index,
                raw: raw.clone(),
            }
        }),
        other => Err(DecodeError::BadTimestamp {
            index,
            raw: format!("{other:?}"),
        }),
    }
}

/// Parse an ISO8601 timestamp to seconds. RFC3339 strings keep their
/// offset; bare datetimes (no offset) are taken as UTC.
fn parse_iso8601(raw: &str) -> Option<Timestamp> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.timestamp_micros() as f64 / 1e6);
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_micros() as f64 / 1e6)
}

fn yaml_to_value(
    index: usize,
    key: &str,
    value: &serde_yaml::Value,
) -> Result<Value, DecodeError> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(v) => Ok(Value::Bool(*v)),
        serde_yaml::Value::Number(n) => n.as_i64().map_or_else(
            || {
                n.as_f64().map(Value::Float).ok_or_else(|| {
                    DecodeError::NonScalarValue {
                        index,
                        key: key.to_string(),
                    }
                })
            },
            |v| Ok(Value::Int(v)),
        ),
        serde_yaml::Value::String(v) => Ok(Value::Str(v.clone())),
        _ => Err(DecodeError::NonScalarValue {
            index,
            key: key.to_string(),
        }),
    }
}
