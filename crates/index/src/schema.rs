use serde::{Deserialize, Serialize};

/// Current on-disk encoding version for [`SimHashRecord`] and [`Posting`].
/// Bump when either struct's field layout changes in a way bincode can't
/// decode across.
pub const INDEX_SCHEMA_VERSION: u32 = 1;

/// One chunk-level SimHash fingerprint, as stored in the band index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimHashRecord {
    pub doc_id: u64,
    /// Index of the chunk within its document, in chunking order.
    pub chunk_id: u32,
    pub fp: u64,
    pub start_line: u32,
    pub end_line: u32,
}

/// One winnowing fingerprint, as stored in the sharded posting index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    pub fp: i64,
    pub doc_id: u64,
    /// Token position within the document's normalized token stream.
    pub pos: u32,
    pub start_line: u32,
    pub end_line: u32,
}

/// Per-document summary kept alongside the posting index: how many
/// fingerprints and tokens a document contributed, after any
/// `MAX_FPS_PER_DOC` downsampling. Lets callers judge coverage ratios
/// without re-tokenizing the document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DocStat {
    pub fp_count: u32,
    pub token_count: u32,
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, crate::error::IndexError> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| crate::error::IndexError::encoding(e.to_string()))
}

pub(crate) fn decode<T: for<'de> Deserialize<'de>>(
    bytes: &[u8],
) -> Result<T, crate::error::IndexError> {
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|e| crate::error::IndexError::encoding(e.to_string()))
}
