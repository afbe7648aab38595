use crate::error::RebuildError;

/// One document available to be (re)indexed.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: u64,
    pub code: String,
}

/// The document collection the index is built from.
///
/// This crate never owns document storage — that's an external
/// collaborator's job (an ORM-backed order table, a content store, a
/// filesystem walk). `DocumentSource` is the seam the builder depends on
/// instead, so `rebuild` stays storage-agnostic.
pub trait DocumentSource: Send + Sync {
    /// Returns up to `limit` documents with `id > after_id`, ordered by id,
    /// optionally bounded above by `upto` (inclusive). An empty result
    /// means the source is exhausted for this cursor.
    fn fetch_batch(
        &self,
        after_id: u64,
        limit: usize,
        upto: Option<u64>,
    ) -> Result<Vec<DocumentRecord>, RebuildError>;

    /// The highest document id already present in the index, used to
    /// resume a rebuild without rescanning documents already indexed. A
    /// source with no cheap way to answer this can return `Ok(0)` to start
    /// from the beginning every time.
    fn high_water_mark(&self) -> Result<u64, RebuildError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// In-memory [`DocumentSource`] for builder tests: a fixed vector of
    /// documents, paginated exactly like a real cursor-based source would
    /// be.
    pub struct VecDocumentSource {
        docs: Vec<DocumentRecord>,
        hwm: Mutex<u64>,
    }

    impl VecDocumentSource {
        pub fn new(docs: Vec<DocumentRecord>) -> Self {
            Self { docs, hwm: Mutex::new(0) }
        }
    }

    impl DocumentSource for VecDocumentSource {
        fn fetch_batch(
            &self,
            after_id: u64,
            limit: usize,
            upto: Option<u64>,
        ) -> Result<Vec<DocumentRecord>, RebuildError> {
            Ok(self
                .docs
                .iter()
                .filter(|d| d.id > after_id && upto.map_or(true, |u| d.id <= u))
                .take(limit)
                .cloned()
                .collect())
        }

        fn high_water_mark(&self) -> Result<u64, RebuildError> {
            Ok(*self.hwm.lock().unwrap())
        }
    }
}
