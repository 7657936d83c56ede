//! One compaction session: clock → compactor → sink.
//!
//! A [`Recorder`] owns the three pieces and drives a tick per observed
//! snapshot, appending the emission (anchor first) to the sink. Sessions
//! are fully independent; run as many side by side as you like.

use anyhow::{Context, Result};
use tracing::debug;

use crate::clock::Clock;
use crate::compactor::{Compactor, Snapshot};
use crate::config::CompactorConfig;
use crate::record::Timestamp;
use crate::sink::Sink;

/// Drives a [`Compactor`] from a [`Clock`] into a [`Sink`].
#[derive(Debug)]
pub struct Recorder<C, S> {
    compactor: Compactor,
    clock: C,
    sink: S,
}

impl<C: Clock, S: Sink> Recorder<C, S> {
    #[must_use]
    pub fn new(config: &CompactorConfig, clock: C, sink: S) -> Self {
        Self {
            compactor: Compactor::new(config),
            clock,
            sink,
        }
    }

    /// Observe the current full state, stamped with the clock's now.
    ///
    /// # Errors
    ///
    /// Tick precondition violations and sink failures, unchanged.
    pub fn observe(&mut self, snapshot: &Snapshot) -> Result<()> {
        let now = self.clock.now();
        self.observe_at(now, snapshot)
    }

    /// Observe with a caller-supplied timestamp.
    ///
    /// # Errors
    ///
    /// Tick precondition violations and sink failures, unchanged.
    pub fn observe_at(&mut self, now: Timestamp, snapshot: &Snapshot) -> Result<()> {
        let emission = self.compactor.tick(now, snapshot)?;
        for record in emission.records() {
            self.sink
                .append(record)
                .context("failed to append record to sink")?;
        }
        if !emission.is_empty() {
            debug!(now, "session: emission appended");
        }
        Ok(())
    }

    /// The underlying compactor, for inspection.
    #[must_use]
    pub const fn compactor(&self) -> &Compactor {
        &self.compactor
    }

    /// The sink, for inspection.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Tear down the session and hand back the sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }
}
