//! Append-mode file persistence.
//!
//! [`FileSink`] writes each record as a single-element YAML sequence
//! fragment, so repeated appends (including across process restarts) form
//! one valid series document. Each append flushes: the sink is the unit of
//! durability, and the compactor above it applies no retry.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotline_core::{Record, Sink};
use tracing::info;

use crate::encode::{TimeFormat, encode_fragment};

/// A [`Sink`] appending YAML fragments to a file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: File,
    format: TimeFormat,
}

impl FileSink {
    /// Open `path` for appending, creating it if missing.
    ///
    /// # Errors
    ///
    /// File open failures, with the path in context.
    pub fn open(path: impl AsRef<Path>, format: TimeFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {} for append", path.display()))?;

        info!(path = %path.display(), "file sink opened");
        Ok(Self { path, file, format })
    }

    /// The file this sink appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn append(&mut self, record: &Record) -> Result<()> {
        let fragment = encode_fragment(record, self.format)
            .with_context(|| format!("Failed to encode record for {}", self.path.display()))?;

        self.file
            .write_all(fragment.as_bytes())
            .and_then(|()| self.file.flush())
            .with_context(|| format!("Failed to append to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_series;
    use plotline_core::{Stamp, Value};

    #[test]
    fn appends_accumulate_into_a_decodable_series() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("series.yaml");

        {
            let mut sink = FileSink::open(&path, TimeFormat::Seconds).expect("open");
            sink.append(&Record::at(0.0)).expect("append keepalive");
            sink.append(&Record::at(0.4).with("a", 1.3)).expect("append");
        }

        // Reopening appends to the same document.
        {
            let mut sink = FileSink::open(&path, TimeFormat::Seconds).expect("reopen");
            sink.append(&Record::at(0.9).with("a", 2.0)).expect("append");
        }

        let text = std::fs::read_to_string(&path).expect("read back");
        let records = decode_series(&text).expect("decode");
        assert_eq!(records.len(), 3);
        assert!(records[0].is_keepalive());
        assert_eq!(records[1].fields.get("a"), Some(&Value::Float(1.3)));
        assert_eq!(records[2].stamp, Stamp::Time(0.9));
    }

    #[test]
    fn open_failure_carries_the_path() {
        let err = FileSink::open("/definitely/not/a/dir/series.yaml", TimeFormat::Seconds)
            .expect_err("open must fail");
        assert!(format!("{err:#}").contains("series.yaml"));
    }
}
