//! Emitted records: a time stamp or span plus sorted key/value fields.
//!
//! A [`Record`] is the unit handed to a [`Sink`](crate::sink::Sink). Data
//! keys live in a `BTreeMap`, so every traversal of a record sees keys in
//! lexicographic order — the deterministic-ordering contract the wire
//! format relies on. A record with no data fields is a valid keepalive.

use std::collections::BTreeMap;

use crate::value::Value;

/// Seconds as a real number. Negative infinity is used internally as a
/// "before any tick" marker and never appears in an emitted record.
pub type Timestamp = f64;

/// When a record applies: an instant, or a half-open interval `[start, end)`
/// for cumulative observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stamp {
    /// A point sample taken at this instant.
    Time(Timestamp),
    /// An accumulation over `[start, end)`.
    Span(Timestamp, Timestamp),
}

impl Stamp {
    /// The instant this stamp begins — the point itself, or the span start.
    #[must_use]
    pub const fn start(&self) -> Timestamp {
        match self {
            Self::Time(t) | Self::Span(t, _) => *t,
        }
    }
}

/// One emitted unit: a stamp plus data fields in sorted key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub stamp: Stamp,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    /// A point record at `t` with no fields yet.
    #[must_use]
    pub const fn at(t: Timestamp) -> Self {
        Self {
            stamp: Stamp::Time(t),
            fields: BTreeMap::new(),
        }
    }

    /// A span record over `[start, end)` with no fields yet.
    #[must_use]
    pub const fn over(start: Timestamp, end: Timestamp) -> Self {
        Self {
            stamp: Stamp::Span(start, end),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// True when the record carries only its stamp — a liveness marker.
    #[must_use]
    pub fn is_keepalive(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_iterate_in_sorted_key_order() {
        let record = Record::at(2.0).with("zeta", 1.0).with("alpha", 2.0).with("mid", 3.0);
        let keys: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn empty_record_is_keepalive() {
        assert!(Record::at(0.0).is_keepalive());
        assert!(!Record::at(0.0).with("a", 1.3).is_keepalive());
    }

    #[test]
    fn stamp_start_covers_both_variants() {
        assert!((Stamp::Time(1.5).start() - 1.5).abs() < f64::EPSILON);
        assert!((Stamp::Span(2.0, 3.0).start() - 2.0).abs() < f64::EPSILON);
    }
}
