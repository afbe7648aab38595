use thiserror::Error;

/// Errors surfaced by the posting and SimHash band indices.
///
/// ## Common causes
/// - `Backend`: the underlying redb database returned an I/O or
///   transaction error — disk full, corrupt file, concurrent writer.
/// - `Encoding`: a stored record failed to decode. This should only ever
///   happen after a schema change; it means the on-disk data predates a
///   breaking change to [`crate::schema`].
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index backend error: {0}")]
    Backend(String),

    #[error("failed to encode/decode index record: {0}")]
    Encoding(String),

    #[error("invalid index config: {0}")]
    InvalidConfig(String),
}

impl IndexError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }
}
