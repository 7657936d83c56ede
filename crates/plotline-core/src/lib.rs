//! plotline-core: online compaction for sparse, irregularly-sampled
//! time-series.
//!
//! A [`Compactor`] ingests full key/value snapshots of a live source, one
//! tick at a time, and emits the minimal set of records a reader needs to
//! reconstruct the full history — including past-value anchors that keep
//! linear interpolation honest and periodic force-written snapshots that
//! bound reader scan-back and double as keepalives.
//!
//! The engine is single-threaded and synchronous: one logical owner calls
//! [`Compactor::tick`] (or drives a [`Recorder`]); blocking and durability
//! live in the caller and the [`Sink`].
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at module seams; `anyhow::Result`
//!   with context at orchestration edges.
//! - **Logging**: `tracing` macros (`debug!`, `trace!`, `info!`).

pub mod clock;
pub mod compactor;
pub mod config;
pub mod record;
pub mod session;
pub mod sink;
pub mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use compactor::{Compactor, Emission, Snapshot, TickError};
pub use config::{CompactorConfig, OutputConfig, RecorderConfig};
pub use record::{Record, Stamp, Timestamp};
pub use session::Recorder;
pub use sink::{MemorySink, Sink};
pub use value::Value;
