use thiserror::Error;

/// Errors raised while configuring or running the fingerprinting engines.
///
/// Malformed source text is never one of these — both engines degrade to an
/// empty fingerprint set rather than fail, since "nothing to compare" is a
/// valid outcome for e.g. a whitespace-only upload.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// A chunking or winnowing configuration has a parameter that can never
    /// produce a usable window (zero size, step, or k-gram length).
    #[error("invalid fingerprint config: {0}")]
    InvalidConfig(String),
}

