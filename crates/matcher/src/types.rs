use serde::{Deserialize, Serialize};

/// Looks up the display metadata for a document by id.
///
/// The matcher only ever needs a document's project name to label a
/// match; it has no business owning a document store, so this is the
/// seam an embedding application plugs its own storage into.
pub trait DocumentMetadataProvider: Send + Sync {
    fn project_name(&self, doc_id: u64) -> Option<String>;
}

/// One chunk-level match from the SimHash pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimHashMatch {
    pub input_lines: String,
    pub match_project: String,
    pub match_order_id: u64,
    pub match_lines: String,
    pub similarity_score: String,
}

/// Report produced by the coarse SimHash chunk-matching pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimHashReport {
    pub filename: String,
    pub total_lines: usize,
    pub duplicate_rate: String,
    pub process_time: String,
    pub details: Vec<SimHashMatch>,
}

/// One input/match line-range pair of evidence for a winnowing candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidencePair {
    pub input_lines: String,
    pub match_lines: String,
}

/// One candidate surviving the winnowing pipeline's recall, rerank, and
/// coverage filters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WinnowMatch {
    pub match_order_id: u64,
    pub match_project: String,
    pub hit_fingerprints: u32,
    pub coverage: String,
    pub evidence: Vec<EvidencePair>,
}

/// Report produced by the winnowing offset-alignment pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WinnowReport {
    pub filename: String,
    pub total_lines: usize,
    pub duplicate_rate: String,
    pub details: Vec<WinnowMatch>,
}

pub(crate) fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// `"12 - 27"` — the spaced style the SimHash report uses.
pub(crate) fn format_line_range_spaced(start: u32, end: u32) -> String {
    format!("{start} - {end}")
}

/// `"12-27"` — the tight style the winnowing report's evidence pairs use.
pub(crate) fn format_line_range_tight(start: u32, end: u32) -> String {
    format!("{start}-{end}")
}
