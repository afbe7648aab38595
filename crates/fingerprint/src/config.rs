use serde::{Deserialize, Serialize};

use crate::error::FingerprintError;

/// Parameters for the SimHash chunking pipeline: how source is cut into
/// overlapping line windows before each window is hashed independently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Lines per chunk.
    pub window_size: usize,
    /// Line stride between chunk starts; smaller than `window_size` means
    /// overlap, which catches matches that straddle a chunk boundary.
    pub step: usize,
    /// Chunks whose trimmed content is shorter than this (in bytes) are
    /// dropped — too little signal to fingerprint meaningfully.
    pub min_chunk_len: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            window_size: 15,
            step: 10,
            min_chunk_len: 50,
        }
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.window_size == 0 || self.step == 0 {
            return Err(FingerprintError::InvalidConfig(
                "window_size and step must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Parameters for the SimHash feature extraction and accumulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimHashConfig {
    /// Bit width of the produced fingerprint. Always 64 in practice; kept
    /// configurable because the accumulator loop is width-generic.
    pub width: u32,
    /// Token window size for the n-gram features that feed the hash.
    pub n_gram: usize,
}

impl Default for SimHashConfig {
    fn default() -> Self {
        Self { width: 64, n_gram: 3 }
    }
}

impl SimHashConfig {
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.width == 0 || self.width > 64 {
            return Err(FingerprintError::InvalidConfig(
                "width must be in 1..=64".into(),
            ));
        }
        if self.n_gram == 0 {
            return Err(FingerprintError::InvalidConfig(
                "n_gram must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Parameters for the winnowing k-gram fingerprinting pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinnowConfig {
    /// Tokens per k-gram hashed as one unit.
    pub k: usize,
    /// Sliding window width, in k-grams, over which the local minimum hash
    /// is selected.
    pub window: usize,
}

impl Default for WinnowConfig {
    fn default() -> Self {
        Self { k: 35, window: 10 }
    }
}

impl WinnowConfig {
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.k == 0 || self.window == 0 {
            return Err(FingerprintError::InvalidConfig(
                "k and window must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
