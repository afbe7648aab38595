use serde::{Deserialize, Serialize};

use fingerprint::{ChunkConfig, SimHashConfig, WinnowConfig};

/// Tunables for [`crate::builder::IndexBuilder::rebuild`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildConfig {
    pub chunk: ChunkConfig,
    pub simhash: SimHashConfig,
    pub winnow: WinnowConfig,

    /// Documents fetched from the source per page.
    pub batch_size: usize,
    /// A document's winnowing fingerprints are uniformly downsampled to at
    /// most this many before being stored, bounding per-document storage
    /// and query cost for pathologically large files.
    pub max_fps_per_doc: usize,
    /// Stop once a document id exceeding this bound would be processed.
    /// `None` means process every document the source has.
    pub upto: Option<u64>,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            chunk: ChunkConfig::default(),
            simhash: SimHashConfig::default(),
            winnow: WinnowConfig::default(),
            batch_size: 100,
            max_fps_per_doc: 1200,
            upto: None,
        }
    }
}
