//! Query pipelines that turn an uploaded source file and a populated
//! [`index::Index`] into a duplicate-check report.
//!
//! Two independent pipelines exist because they trade off differently:
//!
//! - [`check_simhash`] is coarse and cheap, tolerant of arbitrary rewording
//!   within a chunk, but only reports chunk-granularity matches.
//! - [`check_winnow`] is precise down to the token position, aligns a
//!   candidate document against the input via its offset histogram, and
//!   reports merged line-range evidence — more expensive, much harder to
//!   evade by reordering.

pub mod config;
pub mod error;
pub mod interval;
mod simhash_pipeline;
mod types;
mod winnow_pipeline;

pub use config::MatchConfig;
pub use error::MatchError;
pub use interval::{covered_lines, merge_intervals, Interval};
pub use simhash_pipeline::check_simhash;
pub use types::{
    DocumentMetadataProvider, EvidencePair, SimHashMatch, SimHashReport, WinnowMatch, WinnowReport,
};
pub use winnow_pipeline::check_winnow;
