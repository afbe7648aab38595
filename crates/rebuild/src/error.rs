use thiserror::Error;

use index::IndexError;

/// Errors raised while (re)building the fingerprint indices from a
/// document source.
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// The document source collaborator failed to produce a batch — a
    /// database outage, a malformed cursor, etc. Kept as an opaque string
    /// since `rebuild` has no opinion on what storage backs the source.
    #[error("document source error: {0}")]
    Source(String),
}
