//! plotline-yaml: the textual wire format for plotline records.
//!
//! A series is a flat YAML block sequence of mappings; each mapping
//! carries exactly one of `time` (point sample) or `span` (half-open
//! `[start, end)` two-element array) plus free-form scalar data keys in
//! sorted order. Timestamps render as real seconds or ISO8601 strings.
//!
//! Encoding one record as a single-element sequence yields an append-safe
//! fragment: concatenating fragments produces one valid YAML document,
//! which is what [`FileSink`] relies on.

pub mod decode;
pub mod encode;
pub mod file;

pub use decode::{DecodeError, decode_series};
pub use encode::{EncodeError, TimeFormat, encode_fragment, encode_series};
pub use file::FileSink;

/// The reserved key for point-sample timestamps.
pub const TIME_KEY: &str = "time";

/// The reserved key for half-open interval stamps.
pub const SPAN_KEY: &str = "span";
