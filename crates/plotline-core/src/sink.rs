//! The append-only record sink the compactor writes into.
//!
//! The sink is the unit of durability: the compactor applies no retry and
//! propagates append failures unchanged. Implementations must preserve the
//! order records are appended in (and the sorted key order within each
//! record, which the record type already guarantees).

use crate::record::Record;

/// Append-only, ordered record emitter.
pub trait Sink {
    /// Append one record.
    ///
    /// # Errors
    ///
    /// Implementation-defined; reported upward unchanged.
    fn append(&mut self, record: &Record) -> anyhow::Result<()>;
}

/// In-memory sink backed by a `Vec`, for tests and buffering hosts.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub records: Vec<Record>,
}

impl MemorySink {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl Sink for MemorySink {
    fn append(&mut self, record: &Record) -> anyhow::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_preserves_append_order() {
        let mut sink = MemorySink::new();
        sink.append(&Record::at(1.0).with("a", 1.0)).expect("append");
        sink.append(&Record::at(2.0).with("a", 2.0)).expect("append");

        assert_eq!(sink.records.len(), 2);
        assert!(sink.records[0].stamp.start() < sink.records[1].stamp.start());
    }
}
