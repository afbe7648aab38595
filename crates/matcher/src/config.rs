use fingerprint::{ChunkConfig, SimHashConfig, WinnowConfig};
use serde::{Deserialize, Serialize};

/// Every tunable threshold the two query pipelines use, gathered so a
/// deployment can retune recall/precision without touching code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    pub chunk: ChunkConfig,
    pub simhash: SimHashConfig,
    pub winnow: WinnowConfig,

    /// Hamming distance at or below which two SimHash fingerprints count
    /// as a chunk-level match.
    pub simhash_hamming_threshold: u32,

    /// An uploaded document's winnowing fingerprints are uniformly
    /// downsampled to at most this many before querying, bounding the cost
    /// of pathologically large uploads.
    pub max_query_fps: usize,
    /// Fingerprints sent to a single shard recall call are batched to at
    /// most this many at a time.
    pub recall_batch: usize,
    /// Number of top-hit candidates reranked per query.
    pub top_n: usize,
    /// Minimum matched-posting count for a candidate to survive past the
    /// recall stage.
    pub min_hit: u32,
    /// Minimum input-line coverage fraction for a candidate to appear in
    /// the report.
    pub min_coverage: f64,
    /// Evidence line-range pairs are capped per candidate.
    pub max_evidence_pairs: usize,
    /// Candidates are capped per report.
    pub max_details: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            chunk: ChunkConfig::default(),
            simhash: SimHashConfig::default(),
            winnow: WinnowConfig::default(),
            simhash_hamming_threshold: 3,
            max_query_fps: 1200,
            recall_batch: 300,
            top_n: 80,
            min_hit: 6,
            min_coverage: 0.06,
            max_evidence_pairs: 10,
            max_details: 20,
        }
    }
}
