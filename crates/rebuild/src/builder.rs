use fingerprint::SimHashEngine;
use index::{DocStat, Index, Posting, SimHashRecord};
use tokenizer::tokenize;
use tracing::{info, warn};

use crate::config::RebuildConfig;
use crate::error::RebuildError;
use crate::source::DocumentSource;

/// Summary of one [`IndexBuilder::rebuild`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    pub documents_processed: u64,
    pub documents_skipped_empty: u64,
    pub fingerprints_written: u64,
    pub last_doc_id: u64,
}

/// Drives a full or resumed rebuild of both fingerprint indices from a
/// [`DocumentSource`].
///
/// Each document is replaced atomically via [`Index::replace_document`]:
/// the builder never leaves a document half-updated, so a crash mid-run
/// only loses progress on the document in flight, not on ones already
/// committed. Resuming picks up from the source's high-water mark (or the
/// caller-supplied cursor), so a rebuild never reprocesses a document it
/// already finished.
pub struct IndexBuilder<'a> {
    index: &'a Index,
    source: &'a dyn DocumentSource,
    config: RebuildConfig,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(index: &'a Index, source: &'a dyn DocumentSource, config: RebuildConfig) -> Self {
        Self { index, source, config }
    }

    /// Rebuilds starting from `source.high_water_mark()`, processing
    /// batches of `config.batch_size` documents until the source is
    /// exhausted or `config.upto` is reached.
    pub fn rebuild(&self) -> Result<RebuildStats, RebuildError> {
        let mut cursor = self.source.high_water_mark()?;
        info!(start_cursor = cursor, "resuming index rebuild");
        self.rebuild_from(&mut cursor)
    }

    /// Rebuilds starting from an explicit cursor rather than the source's
    /// high-water mark — used when a caller wants to force a full rewrite.
    pub fn rebuild_from_cursor(&self, after_id: u64) -> Result<RebuildStats, RebuildError> {
        let mut cursor = after_id;
        self.rebuild_from(&mut cursor)
    }

    fn rebuild_from(&self, cursor: &mut u64) -> Result<RebuildStats, RebuildError> {
        let simhash_engine = SimHashEngine::new(self.config.simhash);
        let mut stats = RebuildStats::default();

        loop {
            let batch = self.source.fetch_batch(*cursor, self.config.batch_size, self.config.upto)?;

            if batch.is_empty() {
                break;
            }

            for doc in &batch {
                *cursor = doc.id;

                if doc.code.trim().is_empty() {
                    stats.documents_skipped_empty += 1;
                    continue;
                }

                let chunks = fingerprint::split_into_chunks(&doc.code, &self.config.chunk);
                let simhash_records: Vec<SimHashRecord> = chunks
                    .iter()
                    .enumerate()
                    .map(|(i, chunk)| SimHashRecord {
                        doc_id: doc.id,
                        chunk_id: i as u32,
                        fp: simhash_engine.compute(&chunk.content),
                        start_line: chunk.start_line,
                        end_line: chunk.end_line,
                    })
                    .collect();

                let stream = tokenize(&doc.code);
                let mut fps = fingerprint::winnow_tokens(&stream.tokens, &stream.lines, &self.config.winnow);
                downsample(&mut fps, self.config.max_fps_per_doc);

                let postings: Vec<Posting> = fps
                    .iter()
                    .map(|f| Posting {
                        fp: f.fp,
                        doc_id: doc.id,
                        pos: f.pos as u32,
                        start_line: f.start_line,
                        end_line: f.end_line,
                    })
                    .collect();

                let stat = DocStat {
                    fp_count: postings.len() as u32,
                    token_count: stream.len() as u32,
                };

                if let Err(e) = self.index.replace_document(doc.id, &simhash_records, &postings, stat) {
                    warn!(doc_id = doc.id, error = %e, "failed to index document, skipping");
                    continue;
                }

                stats.documents_processed += 1;
                stats.fingerprints_written += (simhash_records.len() + postings.len()) as u64;
            }

            info!(
                up_to_doc_id = *cursor,
                processed = stats.documents_processed,
                "rebuild batch committed"
            );

            if let Some(upto) = self.config.upto {
                if *cursor >= upto {
                    break;
                }
            }
        }

        stats.last_doc_id = *cursor;
        if stats.documents_processed == 0 {
            warn!(cursor = *cursor, "rebuild made no progress from this cursor");
        }
        Ok(stats)
    }
}

/// Uniformly downsamples `fps` to at most `cap` entries by keeping every
/// `len / cap`th element, rather than truncating, so the kept fingerprints
/// stay spread across the whole document instead of clustering at the
/// start.
fn downsample(fps: &mut Vec<fingerprint::Fingerprint>, cap: usize) {
    if fps.len() <= cap || cap == 0 {
        return;
    }
    let step = (fps.len() / cap).max(1);
    *fps = fps.iter().step_by(step).take(cap).copied().collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::test_support::VecDocumentSource;
    use crate::source::DocumentRecord;
    use index::{BackendConfig, IndexBackend};

    fn doc(id: u64, code: &str) -> DocumentRecord {
        DocumentRecord { id, code: code.to_string() }
    }

    fn sample_code(seed: u64) -> String {
        (0..40)
            .map(|i| format!("function f{seed}_{i}(x) {{ return x + {i}; }}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Wraps an [`InMemoryBackend`] and fails every write for one chosen
    /// `doc_id`, so tests can exercise the "one document's index failure
    /// doesn't abort the run" behavior without a real storage fault.
    struct FailingOnDocBackend {
        inner: index::InMemoryBackend,
        failing_doc_id: u64,
    }

    impl IndexBackend for FailingOnDocBackend {
        fn simhash_put(&self, doc_id: u64, records: &[SimHashRecord]) -> Result<(), index::IndexError> {
            if doc_id == self.failing_doc_id {
                return Err(index::IndexError::backend("simulated failure"));
            }
            self.inner.simhash_put(doc_id, records)
        }
        fn simhash_delete(&self, doc_id: u64) -> Result<(), index::IndexError> {
            self.inner.simhash_delete(doc_id)
        }
        fn simhash_recall_band(&self, band_idx: u8, band_val: u16) -> Result<Vec<SimHashRecord>, index::IndexError> {
            self.inner.simhash_recall_band(band_idx, band_val)
        }
        fn postings_put(&self, doc_id: u64, postings: &[Posting]) -> Result<(), index::IndexError> {
            self.inner.postings_put(doc_id, postings)
        }
        fn postings_delete(&self, doc_id: u64) -> Result<(), index::IndexError> {
            self.inner.postings_delete(doc_id)
        }
        fn postings_recall(&self, shard: u8, fps: &[i64]) -> Result<Vec<Posting>, index::IndexError> {
            self.inner.postings_recall(shard, fps)
        }
        fn postings_fetch_for_doc(&self, doc_id: u64, fps: &[i64]) -> Result<Vec<Posting>, index::IndexError> {
            self.inner.postings_fetch_for_doc(doc_id, fps)
        }
        fn doc_stat_put(&self, doc_id: u64, stat: DocStat) -> Result<(), index::IndexError> {
            self.inner.doc_stat_put(doc_id, stat)
        }
        fn doc_stat_get(&self, doc_id: u64) -> Result<Option<DocStat>, index::IndexError> {
            self.inner.doc_stat_get(doc_id)
        }
        fn doc_stat_delete(&self, doc_id: u64) -> Result<(), index::IndexError> {
            self.inner.doc_stat_delete(doc_id)
        }
    }

    #[test]
    fn a_single_document_failure_does_not_abort_the_rest_of_the_rebuild() {
        let backend = FailingOnDocBackend { inner: index::InMemoryBackend::new(), failing_doc_id: 2 };
        let index = Index::new(Box::new(backend));
        let source = VecDocumentSource::new(vec![
            doc(1, &sample_code(1)),
            doc(2, &sample_code(2)),
            doc(3, &sample_code(3)),
        ]);
        let builder = IndexBuilder::new(&index, &source, RebuildConfig::default());
        let stats = builder.rebuild().unwrap();

        assert_eq!(stats.documents_processed, 2);
        assert_eq!(stats.last_doc_id, 3, "cursor advances past the failed document too");
    }

    #[test]
    fn rebuild_processes_every_document_once() {
        let index = Index::open(&BackendConfig::in_memory()).unwrap();
        let source = VecDocumentSource::new(vec![
            doc(1, &sample_code(1)),
            doc(2, &sample_code(2)),
            doc(3, &sample_code(3)),
        ]);
        let builder = IndexBuilder::new(&index, &source, RebuildConfig { batch_size: 2, ..Default::default() });
        let stats = builder.rebuild().unwrap();
        assert_eq!(stats.documents_processed, 3);
        assert_eq!(stats.last_doc_id, 3);
    }

    #[test]
    fn empty_document_bodies_are_skipped_not_errored() {
        let index = Index::open(&BackendConfig::in_memory()).unwrap();
        let source = VecDocumentSource::new(vec![doc(1, "   \n  \n"), doc(2, &sample_code(2))]);
        let builder = IndexBuilder::new(&index, &source, RebuildConfig::default());
        let stats = builder.rebuild().unwrap();
        assert_eq!(stats.documents_skipped_empty, 1);
        assert_eq!(stats.documents_processed, 1);
    }

    #[test]
    fn rebuild_from_cursor_skips_already_processed_documents() {
        let index = Index::open(&BackendConfig::in_memory()).unwrap();
        let source = VecDocumentSource::new(vec![doc(1, &sample_code(1)), doc(2, &sample_code(2))]);
        let builder = IndexBuilder::new(&index, &source, RebuildConfig::default());
        let stats = builder.rebuild_from_cursor(1).unwrap();
        assert_eq!(stats.documents_processed, 1);
        assert_eq!(stats.last_doc_id, 2);
    }

    #[test]
    fn upto_bound_stops_processing_past_the_limit() {
        let index = Index::open(&BackendConfig::in_memory()).unwrap();
        let source = VecDocumentSource::new(vec![
            doc(1, &sample_code(1)),
            doc(2, &sample_code(2)),
            doc(3, &sample_code(3)),
        ]);
        let builder = IndexBuilder::new(&index, &source, RebuildConfig { upto: Some(2), ..Default::default() });
        let stats = builder.rebuild().unwrap();
        assert_eq!(stats.documents_processed, 2);
    }

    #[test]
    fn downsample_keeps_entries_spread_across_the_document() {
        let mut fps: Vec<fingerprint::Fingerprint> = (0..1000)
            .map(|i| fingerprint::Fingerprint { fp: i, pos: i as usize, start_line: 1, end_line: 2 })
            .collect();
        downsample(&mut fps, 100);
        assert!(fps.len() <= 100);
        assert!(fps.last().unwrap().pos > 500);
    }
}
