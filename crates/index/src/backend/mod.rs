mod memory;
#[cfg(feature = "redb-backend")]
pub mod redb_backend;

use serde::{Deserialize, Serialize};

pub use memory::InMemoryBackend;
#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;

use crate::error::IndexError;
use crate::schema::{DocStat, Posting, SimHashRecord};

/// Storage contract both SimHash band recall and winnowing posting recall
/// are built on. One document's write is expected to be atomic: callers
/// replace a document's fingerprints by calling the relevant `delete_*`
/// and `put_*` within the same backend-level transaction boundary the
/// implementation provides (see [`IndexBackend::replace_document`]).
pub trait IndexBackend: Send + Sync {
    /// Inserts SimHash records for `doc_id`, indexed under all 4 bands of
    /// each record's fingerprint.
    fn simhash_put(&self, doc_id: u64, records: &[SimHashRecord]) -> Result<(), IndexError>;

    /// Removes every SimHash record previously stored for `doc_id`.
    fn simhash_delete(&self, doc_id: u64) -> Result<(), IndexError>;

    /// Returns every record whose fingerprint has `band_val` in band
    /// `band_idx` (0..4). Disjunction across bands is the caller's job.
    fn simhash_recall_band(
        &self,
        band_idx: u8,
        band_val: u16,
    ) -> Result<Vec<SimHashRecord>, IndexError>;

    /// Inserts winnowing postings for `doc_id`, sharded by fingerprint.
    fn postings_put(&self, doc_id: u64, postings: &[Posting]) -> Result<(), IndexError>;

    /// Removes every posting previously stored for `doc_id`, across all
    /// shards.
    fn postings_delete(&self, doc_id: u64) -> Result<(), IndexError>;

    /// Recalls postings in shard `shard` whose fingerprint is one of `fps`.
    /// `fps` is expected to already be shard-homogeneous (the caller
    /// partitions with [`crate::shard::group_by_shard`] first) and bounded
    /// to a sane batch size.
    fn postings_recall(&self, shard: u8, fps: &[i64]) -> Result<Vec<Posting>, IndexError>;

    /// Fetches every posting stored for `doc_id`, across all shards,
    /// restricted to the fingerprints in `fps`. Used during reranking to
    /// pull a single candidate's evidence without rescanning every shard.
    fn postings_fetch_for_doc(&self, doc_id: u64, fps: &[i64]) -> Result<Vec<Posting>, IndexError>;

    fn doc_stat_put(&self, doc_id: u64, stat: DocStat) -> Result<(), IndexError>;
    fn doc_stat_get(&self, doc_id: u64) -> Result<Option<DocStat>, IndexError>;
    fn doc_stat_delete(&self, doc_id: u64) -> Result<(), IndexError>;

    /// Atomically replaces everything stored for `doc_id`: deletes the old
    /// SimHash records and postings, then inserts the new ones. Used by the
    /// index builder so a rebuild never leaves a document half-updated.
    fn replace_document(
        &self,
        doc_id: u64,
        simhash: &[SimHashRecord],
        postings: &[Posting],
        stat: DocStat,
    ) -> Result<(), IndexError> {
        self.simhash_delete(doc_id)?;
        self.postings_delete(doc_id)?;
        self.simhash_put(doc_id, simhash)?;
        self.postings_put(doc_id, postings)?;
        self.doc_stat_put(doc_id, stat)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), IndexError> {
        Ok(())
    }
}

/// How to construct an [`IndexBackend`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum BackendConfig {
    /// Embedded, file-backed redb database at `path`.
    #[cfg(feature = "redb-backend")]
    Redb { path: std::path::PathBuf },
    /// Volatile, process-lifetime storage. Used for tests and for the
    /// in-process demo server.
    #[default]
    InMemory,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    #[cfg(feature = "redb-backend")]
    pub fn redb(path: impl Into<std::path::PathBuf>) -> Self {
        Self::Redb { path: path.into() }
    }

    pub fn build(&self) -> Result<Box<dyn IndexBackend>, IndexError> {
        match self {
            #[cfg(feature = "redb-backend")]
            Self::Redb { path } => Ok(Box::new(RedbBackend::open(path)?)),
            Self::InMemory => Ok(Box::new(InMemoryBackend::new())),
        }
    }
}
