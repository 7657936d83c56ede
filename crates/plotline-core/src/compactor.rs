//! Online compaction of sparse time-series snapshots.
//!
//! The [`Compactor`] sits between a live key/value source and an
//! append-only sink. At each tick it diffs the full current snapshot
//! against the last values it knows about and decides what minimal subset
//! to write, balancing two properties: smallest possible output, and
//! shape-preservation for readers that linearly interpolate between
//! written points.
//!
//! # Anchor Records
//!
//! When a key changes for the first time since the last write, simply
//! writing the new value would let a naive plotter draw a slope from the
//! key's *last written* point to the new one — even though the value sat
//! flat in between. The compactor prevents that by first emitting an
//! **anchor record**: the key's previous value, stamped at the previous
//! tick. Keys that were part of the most recent written delta
//! (`changed_since_write`) need no anchor; their last written point is
//! already adjacent.
//!
//! # Force Writes
//!
//! If nothing has been written for longer than `force_interval`, the next
//! tick emits a full snapshot of every known value (a keepalive when
//! nothing is known yet). This bounds how far a reader must scan back to
//! reconstruct full state and doubles as a liveness marker.
//!
//! # First Observation Is Not A Change
//!
//! A key transitioning from "never observed" to a real value produces no
//! delta and no anchor. Quiet ticks return before the snapshot is folded
//! into `last_values`, so a first-seen key is adopted only once some tick
//! actually emits (a change elsewhere, or a force-write). The adoption is
//! *silent*: the value was never written, yet a later real change for
//! that key anchors against it. This is deliberate, avoiding anchor noise
//! on startup, and is pinned by tests rather than smoothed over.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::config::CompactorConfig;
use crate::record::{Record, Stamp, Timestamp};
use crate::value::Value;

/// Full current state of the source at one tick. Not a delta: the
/// compactor computes deltas itself.
pub type Snapshot = BTreeMap<String, Value>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors reported by [`Compactor::tick`].
///
/// A failed tick mutates nothing: the compactor's state is exactly what it
/// was before the call.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// `now` is earlier than a previous tick's time. Ticks must be
    /// non-decreasing; ties are allowed.
    #[error("tick time went backwards: now={now} < previous tick={last}")]
    TimeRegression { now: Timestamp, last: Timestamp },
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

/// What one tick decided to write: at most one anchor and one current
/// record, in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emission {
    /// Past-value anchor, stamped at the previous tick.
    pub anchor: Option<Record>,
    /// The delta (or forced full snapshot), stamped at `now`.
    pub current: Option<Record>,
}

impl Emission {
    /// True when the tick decided to write nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.anchor.is_none() && self.current.is_none()
    }

    /// Records in emission order: anchor first, then current.
    #[must_use]
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.anchor.iter().chain(self.current.iter())
    }

    /// Consuming variant of [`records`](Self::records).
    #[must_use]
    pub fn into_records(self) -> impl Iterator<Item = Record> {
        self.anchor.into_iter().chain(self.current)
    }
}

// ---------------------------------------------------------------------------
// Compactor
// ---------------------------------------------------------------------------

/// The compaction decision engine. One instance per session; instances
/// are fully independent (no globals).
#[derive(Debug, Clone)]
pub struct Compactor {
    /// Most recent value per key. [`Value::Null`] means "never observed"
    /// (or vanished); null values are never written.
    last_values: BTreeMap<String, Value>,
    /// Keys that were part of the most recently *written* delta. These
    /// need no anchor on their next change.
    changed_since_write: BTreeSet<String>,
    did_first_write: bool,
    /// Negative infinity before the first write, so the first tick always
    /// satisfies the force-write test and emits an initial record.
    last_write_time: Timestamp,
    last_tick_time: Timestamp,
    force_interval: f64,
}

impl Compactor {
    /// A compactor with no declared keys.
    #[must_use]
    pub fn new(config: &CompactorConfig) -> Self {
        Self::with_declared_keys(config, std::iter::empty::<String>())
    }

    /// A compactor seeded with the initially declared key set: each key
    /// starts never-observed, and counts as part of the (empty) initial
    /// written delta so its first change needs no anchor.
    #[must_use]
    pub fn with_declared_keys<I, K>(config: &CompactorConfig, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let declared: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        Self {
            last_values: declared.iter().cloned().map(|k| (k, Value::Null)).collect(),
            changed_since_write: declared,
            did_first_write: false,
            last_write_time: f64::NEG_INFINITY,
            last_tick_time: f64::NEG_INFINITY,
            force_interval: config.force_interval,
        }
    }

    /// Run one compaction decision over the full current `snapshot`.
    ///
    /// `now` must be non-decreasing across calls; ties are treated as the
    /// same instant. Returns the records to append, anchor first.
    ///
    /// # Errors
    ///
    /// [`TickError::TimeRegression`] when `now` is earlier than a previous
    /// tick's time. No state is mutated on error.
    pub fn tick(&mut self, now: Timestamp, snapshot: &Snapshot) -> Result<Emission, TickError> {
        if now < self.last_tick_time {
            return Err(TickError::TimeRegression {
                now,
                last: self.last_tick_time,
            });
        }

        // Step 1: keys with a known prior value that differ now. A
        // never-observed key produces no change — first observation is
        // not a change.
        let mut changes: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in snapshot {
            if let Some(prior) = self.last_values.get(key) {
                if !prior.is_null() && prior != value {
                    changes.insert(key.clone(), value.clone());
                }
            }
        }

        let force_write = now > self.last_write_time + self.force_interval;

        // Whether any real value was known before this tick. Decides
        // below if a force-write whose write set filtered down to nothing
        // may still emit its zero-key keepalive.
        let knew_values = self.last_values.values().any(|v| !v.is_null());

        if changes.is_empty() && !force_write {
            trace!(now, "tick: no changes, force-write not due");
            self.last_tick_time = now;
            return Ok(Emission::default());
        }

        // Steps 4–5: keys changing for the first time since the last
        // write get an anchor carrying their prior value, stamped at the
        // previous tick so interpolating readers see the flat segment.
        let mut past: BTreeMap<String, Value> = BTreeMap::new();
        for key in changes.keys() {
            if !self.changed_since_write.contains(key) {
                if let Some(prior) = self.last_values.get(key) {
                    past.insert(key.clone(), prior.clone());
                }
            }
        }
        let anchor = if past.is_empty() {
            None
        } else {
            Some(Record {
                stamp: Stamp::Time(self.last_tick_time),
                fields: past,
            })
        };

        // Step 6: a force-write seeds the record with every known value,
        // then the fresh changes win on conflict. Null (absent) values
        // are never written.
        let mut writes: BTreeMap<String, Value> = BTreeMap::new();
        if force_write {
            for (key, value) in &self.last_values {
                if !value.is_null() {
                    writes.insert(key.clone(), value.clone());
                }
            }
        }
        for (key, value) in &changes {
            writes.insert(key.clone(), value.clone());
        }
        writes.retain(|_, value| !value.is_null());

        // Step 7: adopt the entire snapshot, not just the changed subset.
        // Quiet ticks never reach this point, so first-seen keys are
        // adopted only by an emitting tick; from then on they anchor
        // later changes.
        for (key, value) in snapshot {
            self.last_values.insert(key.clone(), value.clone());
        }

        // Step 8: emit the current record. A zero-key record is legal
        // only as the keepalive of a force-write that had nothing to
        // snapshot in the first place. If real values were known and all
        // vanished this tick, nothing is emitted and the force timer
        // stays due.
        let emit_keepalive = force_write && !knew_values;
        let current = if writes.is_empty() && !emit_keepalive {
            None
        } else {
            self.did_first_write = true;
            self.last_write_time = now;
            self.changed_since_write = changes.keys().cloned().collect();
            Some(Record {
                stamp: Stamp::Time(now),
                fields: writes,
            })
        };

        debug!(
            now,
            changed = changes.len(),
            force_write,
            anchored = anchor.as_ref().map_or(0, |r| r.fields.len()),
            wrote = current.as_ref().map_or(0, |r| r.fields.len()),
            "tick: emitting"
        );

        self.last_tick_time = now;
        Ok(Emission { anchor, current })
    }

    /// The configured force-write interval in seconds.
    #[must_use]
    pub const fn force_interval(&self) -> f64 {
        self.force_interval
    }

    /// True once any record has been written this session.
    #[must_use]
    pub const fn did_first_write(&self) -> bool {
        self.did_first_write
    }

    /// Time of the most recent write (negative infinity before the first).
    #[must_use]
    pub const fn last_write_time(&self) -> Timestamp {
        self.last_write_time
    }

    /// The last value known for `key`, if the key has ever been seen.
    /// [`Value::Null`] means declared but never observed.
    #[must_use]
    pub fn last_value(&self, key: &str) -> Option<&Value> {
        self.last_values.get(key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
