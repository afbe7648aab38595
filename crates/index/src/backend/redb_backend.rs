use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use redb::{Database, MultimapTableDefinition, TableDefinition};

use super::IndexBackend;
use crate::error::IndexError;
use crate::schema::{decode, encode, DocStat, Posting, SimHashRecord};
use crate::shard::{shard_of_fp, table_name, NUM_SHARDS};

const SIMHASH_BAND_TABLE: MultimapTableDefinition<u32, Vec<u8>> =
    MultimapTableDefinition::new("simhash_bands");
const SIMHASH_BY_DOC_TABLE: MultimapTableDefinition<u64, Vec<u8>> =
    MultimapTableDefinition::new("simhash_by_doc");
const POSTINGS_BY_DOC_TABLE: MultimapTableDefinition<u64, Vec<u8>> =
    MultimapTableDefinition::new("postings_by_doc");
const DOC_STAT_TABLE: TableDefinition<u64, Vec<u8>> = TableDefinition::new("doc_stats");

/// The 64 posting shard tables, named once at process start. Each table's
/// name is leaked to `'static` so it can back a `const`-friendly
/// `MultimapTableDefinition`; this happens exactly 64 times per process,
/// never per request.
static SHARD_TABLES: Lazy<[MultimapTableDefinition<'static, i64, Vec<u8>>; NUM_SHARDS]> =
    Lazy::new(|| {
        std::array::from_fn(|i| {
            let name: &'static str = Box::leak(table_name(i as u8).into_boxed_str());
            MultimapTableDefinition::new(name)
        })
    });

fn band_key(band_idx: u8, band_val: u16) -> u32 {
    ((band_idx as u32) << 16) | band_val as u32
}

/// Embedded, ACID-durable [`IndexBackend`] on top of `redb`. Each logical
/// write (band insert, posting insert, doc-stat write) is its own
/// transaction; [`IndexBackend::replace_document`] is the unit callers
/// should treat as atomic, implemented here as a single write transaction
/// spanning all four operations rather than the default's four separate
/// ones.
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let db = Database::create(path.as_ref()).map_err(|e| IndexError::backend(e.to_string()))?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl IndexBackend for RedbBackend {
    fn simhash_put(&self, doc_id: u64, records: &[SimHashRecord]) -> Result<(), IndexError> {
        let txn = self.db.begin_write().map_err(|e| IndexError::backend(e.to_string()))?;
        {
            let mut bands = txn
                .open_multimap_table(SIMHASH_BAND_TABLE)
                .map_err(|e| IndexError::backend(e.to_string()))?;
            let mut by_doc = txn
                .open_multimap_table(SIMHASH_BY_DOC_TABLE)
                .map_err(|e| IndexError::backend(e.to_string()))?;
            for record in records {
                let bytes = encode(record)?;
                for (band_idx, &band_val) in
                    fingerprint::SimHashEngine::split_to_bands(record.fp).iter().enumerate()
                {
                    bands
                        .insert(band_key(band_idx as u8, band_val), &bytes)
                        .map_err(|e| IndexError::backend(e.to_string()))?;
                }
                by_doc
                    .insert(doc_id, &bytes)
                    .map_err(|e| IndexError::backend(e.to_string()))?;
            }
        }
        txn.commit().map_err(|e| IndexError::backend(e.to_string()))
    }

    fn simhash_delete(&self, doc_id: u64) -> Result<(), IndexError> {
        let txn = self.db.begin_write().map_err(|e| IndexError::backend(e.to_string()))?;
        {
            let mut by_doc = txn
                .open_multimap_table(SIMHASH_BY_DOC_TABLE)
                .map_err(|e| IndexError::backend(e.to_string()))?;
            let stored: Vec<Vec<u8>> = by_doc
                .remove_all(doc_id)
                .map_err(|e| IndexError::backend(e.to_string()))?
                .map(|entry| entry.map(|guard| guard.value().to_vec()))
                .collect::<Result<_, _>>()
                .map_err(|e| IndexError::backend(e.to_string()))?;

            let mut bands = txn
                .open_multimap_table(SIMHASH_BAND_TABLE)
                .map_err(|e| IndexError::backend(e.to_string()))?;
            for bytes in &stored {
                let record: SimHashRecord = decode(bytes)?;
                for (band_idx, &band_val) in
                    fingerprint::SimHashEngine::split_to_bands(record.fp).iter().enumerate()
                {
                    bands
                        .remove(band_key(band_idx as u8, band_val), bytes)
                        .map_err(|e| IndexError::backend(e.to_string()))?;
                }
            }
        }
        txn.commit().map_err(|e| IndexError::backend(e.to_string()))
    }

    fn simhash_recall_band(
        &self,
        band_idx: u8,
        band_val: u16,
    ) -> Result<Vec<SimHashRecord>, IndexError> {
        let txn = self.db.begin_read().map_err(|e| IndexError::backend(e.to_string()))?;
        let bands = txn
            .open_multimap_table(SIMHASH_BAND_TABLE)
            .map_err(|e| IndexError::backend(e.to_string()))?;
        let mut out = Vec::new();
        for entry in bands
            .get(band_key(band_idx, band_val))
            .map_err(|e| IndexError::backend(e.to_string()))?
        {
            let guard = entry.map_err(|e| IndexError::backend(e.to_string()))?;
            out.push(decode(&guard.value())?);
        }
        Ok(out)
    }

    fn postings_put(&self, doc_id: u64, postings: &[Posting]) -> Result<(), IndexError> {
        let txn = self.db.begin_write().map_err(|e| IndexError::backend(e.to_string()))?;
        {
            let mut by_doc = txn
                .open_multimap_table(POSTINGS_BY_DOC_TABLE)
                .map_err(|e| IndexError::backend(e.to_string()))?;
            for posting in postings {
                let bytes = encode(posting)?;
                by_doc
                    .insert(doc_id, &bytes)
                    .map_err(|e| IndexError::backend(e.to_string()))?;
                let shard = shard_of_fp(posting.fp) as usize;
                let mut shard_table = txn
                    .open_multimap_table(SHARD_TABLES[shard])
                    .map_err(|e| IndexError::backend(e.to_string()))?;
                shard_table
                    .insert(posting.fp, &bytes)
                    .map_err(|e| IndexError::backend(e.to_string()))?;
            }
        }
        txn.commit().map_err(|e| IndexError::backend(e.to_string()))
    }

    fn postings_delete(&self, doc_id: u64) -> Result<(), IndexError> {
        let txn = self.db.begin_write().map_err(|e| IndexError::backend(e.to_string()))?;
        {
            let mut by_doc = txn
                .open_multimap_table(POSTINGS_BY_DOC_TABLE)
                .map_err(|e| IndexError::backend(e.to_string()))?;
            let stored: Vec<Vec<u8>> = by_doc
                .remove_all(doc_id)
                .map_err(|e| IndexError::backend(e.to_string()))?
                .map(|entry| entry.map(|guard| guard.value().to_vec()))
                .collect::<Result<_, _>>()
                .map_err(|e| IndexError::backend(e.to_string()))?;

            for bytes in &stored {
                let posting: Posting = decode(bytes)?;
                let shard = shard_of_fp(posting.fp) as usize;
                let mut shard_table = txn
                    .open_multimap_table(SHARD_TABLES[shard])
                    .map_err(|e| IndexError::backend(e.to_string()))?;
                shard_table
                    .remove(posting.fp, bytes)
                    .map_err(|e| IndexError::backend(e.to_string()))?;
            }
        }
        txn.commit().map_err(|e| IndexError::backend(e.to_string()))
    }

    fn postings_recall(&self, shard: u8, fps: &[i64]) -> Result<Vec<Posting>, IndexError> {
        let txn = self.db.begin_read().map_err(|e| IndexError::backend(e.to_string()))?;
        let shard_table = txn
            .open_multimap_table(SHARD_TABLES[shard as usize])
            .map_err(|e| IndexError::backend(e.to_string()))?;
        let mut out = Vec::new();
        for &fp in fps {
            for entry in shard_table.get(fp).map_err(|e| IndexError::backend(e.to_string()))? {
                let guard = entry.map_err(|e| IndexError::backend(e.to_string()))?;
                out.push(decode(&guard.value())?);
            }
        }
        Ok(out)
    }

    fn postings_fetch_for_doc(&self, doc_id: u64, fps: &[i64]) -> Result<Vec<Posting>, IndexError> {
        let wanted: hashbrown::HashSet<i64> = fps.iter().copied().collect();
        let txn = self.db.begin_read().map_err(|e| IndexError::backend(e.to_string()))?;
        let by_doc = txn
            .open_multimap_table(POSTINGS_BY_DOC_TABLE)
            .map_err(|e| IndexError::backend(e.to_string()))?;
        let mut out = Vec::new();
        for entry in by_doc.get(doc_id).map_err(|e| IndexError::backend(e.to_string()))? {
            let guard = entry.map_err(|e| IndexError::backend(e.to_string()))?;
            let posting: Posting = decode(&guard.value())?;
            if wanted.contains(&posting.fp) {
                out.push(posting);
            }
        }
        Ok(out)
    }

    fn doc_stat_put(&self, doc_id: u64, stat: DocStat) -> Result<(), IndexError> {
        let txn = self.db.begin_write().map_err(|e| IndexError::backend(e.to_string()))?;
        {
            let mut table = txn
                .open_table(DOC_STAT_TABLE)
                .map_err(|e| IndexError::backend(e.to_string()))?;
            table
                .insert(doc_id, encode(&stat)?)
                .map_err(|e| IndexError::backend(e.to_string()))?;
        }
        txn.commit().map_err(|e| IndexError::backend(e.to_string()))
    }

    fn doc_stat_get(&self, doc_id: u64) -> Result<Option<DocStat>, IndexError> {
        let txn = self.db.begin_read().map_err(|e| IndexError::backend(e.to_string()))?;
        let table = txn
            .open_table(DOC_STAT_TABLE)
            .map_err(|e| IndexError::backend(e.to_string()))?;
        match table.get(doc_id).map_err(|e| IndexError::backend(e.to_string()))? {
            Some(guard) => Ok(Some(decode(&guard.value())?)),
            None => Ok(None),
        }
    }

    fn doc_stat_delete(&self, doc_id: u64) -> Result<(), IndexError> {
        let txn = self.db.begin_write().map_err(|e| IndexError::backend(e.to_string()))?;
        {
            let mut table = txn
                .open_table(DOC_STAT_TABLE)
                .map_err(|e| IndexError::backend(e.to_string()))?;
            table.remove(doc_id).map_err(|e| IndexError::backend(e.to_string()))?;
        }
        txn.commit().map_err(|e| IndexError::backend(e.to_string()))
    }

    fn flush(&self) -> Result<(), IndexError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SimHashRecord;

    fn open_tmp() -> (RedbBackend, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("index.redb")).unwrap();
        (backend, dir)
    }

    #[test]
    fn simhash_round_trips_through_one_band() {
        let (backend, _dir) = open_tmp();
        let fp = 0x0102_0304_0506_0708u64;
        let record = SimHashRecord { doc_id: 1, chunk_id: 0, fp, start_line: 1, end_line: 15 };
        backend.simhash_put(1, &[record]).unwrap();
        let band0 = fingerprint::SimHashEngine::split_to_bands(fp)[0];
        let hits = backend.simhash_recall_band(0, band0).unwrap();
        assert_eq!(hits, vec![record]);
    }

    #[test]
    fn postings_put_then_recall_by_shard() {
        let (backend, _dir) = open_tmp();
        let fp = 777i64;
        let posting = Posting { fp, doc_id: 5, pos: 3, start_line: 10, end_line: 12 };
        backend.postings_put(5, &[posting]).unwrap();
        let shard = shard_of_fp(fp);
        assert_eq!(backend.postings_recall(shard, &[fp]).unwrap(), vec![posting]);
    }

    #[test]
    fn replace_document_clears_previous_state() {
        let (backend, _dir) = open_tmp();
        let fp = 99i64;
        let posting = Posting { fp, doc_id: 1, pos: 0, start_line: 1, end_line: 2 };
        let stat = DocStat { fp_count: 1, token_count: 5 };
        backend.replace_document(1, &[], &[posting], stat).unwrap();
        backend.replace_document(1, &[], &[], DocStat::default()).unwrap();
        let shard = shard_of_fp(fp);
        assert!(backend.postings_recall(shard, &[fp]).unwrap().is_empty());
        assert_eq!(backend.doc_stat_get(1).unwrap(), Some(DocStat::default()));
    }
}
