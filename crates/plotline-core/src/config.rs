//! Recorder configuration, loadable from TOML.
//!
//! Missing file means defaults; a malformed file is an error with the
//! offending path in context.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning for the compaction decision itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactorConfig {
    /// Seconds of silence after which the next tick force-writes a full
    /// snapshot (keepalive). Default 1.0.
    #[serde(default = "default_force_interval")]
    pub force_interval: f64,
}

impl Default for CompactorConfig {
    fn default() -> Self {
        Self {
            force_interval: default_force_interval(),
        }
    }
}

/// Output formatting knobs consumed by encoding adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// How timestamps are rendered: `"seconds"` (real number) or
    /// `"iso8601"`. Adapters normalize and validate this value.
    #[serde(default = "default_timestamps")]
    pub timestamps: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            timestamps: default_timestamps(),
        }
    }
}

/// Full recorder configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecorderConfig {
    #[serde(default)]
    pub compaction: CompactorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl RecorderConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Unreadable or unparsable files, with the path in context.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

const fn default_force_interval() -> f64 {
    1.0
}

fn default_timestamps() -> String {
    "seconds".to_string()
}
