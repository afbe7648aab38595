use thiserror::Error;

use index::IndexError;

/// Errors raised while running a duplicate-check query pipeline.
///
/// ## Common causes
/// - `Index`: the underlying storage layer failed mid-query — see the
///   wrapped [`IndexError`] for whether it's transient (lock contention)
///   or structural (corrupt record).
/// - `Decode`: the uploaded file's bytes aren't valid UTF-8. This is
///   handled as a soft failure at the HTTP layer (a 200 response carrying
///   an error field), not a hard error, but the pipeline itself still
///   needs a typed way to report it.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("upload is not valid UTF-8 text")]
    Decode,
}
