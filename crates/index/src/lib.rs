//! Storage for the two fingerprint indices that back near-duplicate
//! recall: a band-partitioned SimHash index (coarse chunk matching) and a
//! 64-way sharded winnowing posting index (exact k-gram recall).
//!
//! [`Index`] is the facade both [`matcher`](../matcher) and
//! [`rebuild`](../rebuild) build on; it owns nothing about tokenization or
//! ranking, only storage and the disjunctive-band / per-shard recall
//! queries that make that storage useful.

pub mod backend;
pub mod error;
pub mod schema;
pub mod shard;

use hashbrown::HashSet;

pub use backend::{BackendConfig, IndexBackend, InMemoryBackend};
#[cfg(feature = "redb-backend")]
pub use backend::RedbBackend;
pub use error::IndexError;
pub use schema::{DocStat, Posting, SimHashRecord, INDEX_SCHEMA_VERSION};

/// Facade over an [`IndexBackend`] exposing the recall shapes the query
/// pipelines actually need, rather than raw per-band/per-shard storage
/// calls.
pub struct Index {
    backend: Box<dyn IndexBackend>,
}

impl Index {
    pub fn new(backend: Box<dyn IndexBackend>) -> Self {
        Self { backend }
    }

    pub fn open(config: &BackendConfig) -> Result<Self, IndexError> {
        Ok(Self::new(config.build()?))
    }

    /// Recalls every SimHash record whose fingerprint shares at least one
    /// band with `fp`. Sound for Hamming distance <= 3 by pigeonhole: 3
    /// flipped bits can spoil at most 3 of the 4 bands, so at least one
    /// band must still match exactly.
    pub fn simhash_recall(&self, fp: u64) -> Result<Vec<SimHashRecord>, IndexError> {
        let bands = fingerprint::SimHashEngine::split_to_bands(fp);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (band_idx, &band_val) in bands.iter().enumerate() {
            for record in self.backend.simhash_recall_band(band_idx as u8, band_val)? {
                if seen.insert((record.doc_id, record.chunk_id)) {
                    out.push(record);
                }
            }
        }
        Ok(out)
    }

    pub fn simhash_put(&self, doc_id: u64, records: &[SimHashRecord]) -> Result<(), IndexError> {
        self.backend.simhash_put(doc_id, records)
    }

    pub fn simhash_delete(&self, doc_id: u64) -> Result<(), IndexError> {
        self.backend.simhash_delete(doc_id)
    }

    /// Recalls postings across every shard `fps` touches, bounding each
    /// shard's lookup to `batch_size` fingerprints at a time so a single
    /// query against a very large fingerprint set can't balloon into one
    /// unbounded scan.
    pub fn postings_recall(&self, fps: &[i64], batch_size: usize) -> Result<Vec<Posting>, IndexError> {
        let grouped = shard::group_by_shard(fps);
        let mut out = Vec::new();
        for (shard, shard_fps) in grouped {
            for batch in shard_fps.chunks(batch_size.max(1)) {
                out.extend(self.backend.postings_recall(shard, batch)?);
            }
        }
        Ok(out)
    }

    pub fn postings_fetch_for_doc(&self, doc_id: u64, fps: &[i64]) -> Result<Vec<Posting>, IndexError> {
        self.backend.postings_fetch_for_doc(doc_id, fps)
    }

    pub fn postings_put(&self, doc_id: u64, postings: &[Posting]) -> Result<(), IndexError> {
        self.backend.postings_put(doc_id, postings)
    }

    pub fn postings_delete(&self, doc_id: u64) -> Result<(), IndexError> {
        self.backend.postings_delete(doc_id)
    }

    pub fn doc_stat(&self, doc_id: u64) -> Result<Option<DocStat>, IndexError> {
        self.backend.doc_stat_get(doc_id)
    }

    pub fn replace_document(
        &self,
        doc_id: u64,
        simhash: &[SimHashRecord],
        postings: &[Posting],
        stat: DocStat,
    ) -> Result<(), IndexError> {
        self.backend.replace_document(doc_id, simhash, postings, stat)
    }

    pub fn delete_document(&self, doc_id: u64) -> Result<(), IndexError> {
        self.backend.simhash_delete(doc_id)?;
        self.backend.postings_delete(doc_id)?;
        self.backend.doc_stat_delete(doc_id)
    }

    pub fn flush(&self) -> Result<(), IndexError> {
        self.backend.flush()
    }
}
