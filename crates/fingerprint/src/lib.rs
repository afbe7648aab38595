//! Two independent fingerprinting engines over tokenized/chunked source:
//!
//! - [`simhash`]: coarse, overlapping line-window fingerprints for "is this
//!   whole chunk roughly the same" comparisons tolerant of minor edits.
//! - [`winnow`]: dense k-gram fingerprints selected by the
//!   Schleimer/Wilkerson/Aiken winnowing algorithm, for "does this exact
//!   sequence of normalized tokens appear" comparisons with precise
//!   position/line evidence.
//!
//! Neither engine owns storage; [`index`] and [`matcher`] build on top of
//! the types here.

pub mod chunk;
pub mod config;
pub mod error;
pub mod simhash;
pub mod winnow;

pub use chunk::{split_into_chunks, Chunk};
pub use config::{ChunkConfig, SimHashConfig, WinnowConfig};
pub use error::FingerprintError;
pub use simhash::{hamming_distance, SimHashEngine};
pub use winnow::{shard_of_fp, winnow as winnow_tokens, Fingerprint};
