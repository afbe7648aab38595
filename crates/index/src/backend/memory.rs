use std::sync::RwLock;

use hashbrown::{HashMap, HashSet};

use super::IndexBackend;
use crate::error::IndexError;
use crate::schema::{DocStat, Posting, SimHashRecord};
use crate::shard::shard_of_fp;

/// Volatile, process-lifetime [`IndexBackend`] backed by in-process maps.
/// Used by tests and by the in-memory demo deployment; never durable.
#[derive(Default)]
pub struct InMemoryBackend {
    // band_idx -> band_val -> records
    bands: RwLock<[HashMap<u16, Vec<SimHashRecord>>; 4]>,
    simhash_by_doc: RwLock<HashMap<u64, Vec<SimHashRecord>>>,
    // shard -> fp -> postings
    postings: RwLock<HashMap<u8, HashMap<i64, Vec<Posting>>>>,
    postings_by_doc: RwLock<HashMap<u64, Vec<Posting>>>,
    doc_stats: RwLock<HashMap<u64, DocStat>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexBackend for InMemoryBackend {
    fn simhash_put(&self, doc_id: u64, records: &[SimHashRecord]) -> Result<(), IndexError> {
        let mut bands = self.bands.write().expect("lock poisoned");
        for record in records {
            for (band_idx, &band_val) in
                fingerprint::SimHashEngine::split_to_bands(record.fp).iter().enumerate()
            {
                bands[band_idx].entry(band_val).or_default().push(*record);
            }
        }
        drop(bands);
        self.simhash_by_doc
            .write()
            .expect("lock poisoned")
            .entry(doc_id)
            .or_default()
            .extend_from_slice(records);
        Ok(())
    }

    fn simhash_delete(&self, doc_id: u64) -> Result<(), IndexError> {
        let removed = self
            .simhash_by_doc
            .write()
            .expect("lock poisoned")
            .remove(&doc_id)
            .unwrap_or_default();
        if removed.is_empty() {
            return Ok(());
        }
        let mut bands = self.bands.write().expect("lock poisoned");
        for record in &removed {
            for (band_idx, &band_val) in
                fingerprint::SimHashEngine::split_to_bands(record.fp).iter().enumerate()
            {
                if let Some(bucket) = bands[band_idx].get_mut(&band_val) {
                    bucket.retain(|r| r.doc_id != doc_id);
                }
            }
        }
        Ok(())
    }

    fn simhash_recall_band(
        &self,
        band_idx: u8,
        band_val: u16,
    ) -> Result<Vec<SimHashRecord>, IndexError> {
        Ok(self.bands.read().expect("lock poisoned")[band_idx as usize]
            .get(&band_val)
            .cloned()
            .unwrap_or_default())
    }

    fn postings_put(&self, doc_id: u64, postings: &[Posting]) -> Result<(), IndexError> {
        let mut by_shard = self.postings.write().expect("lock poisoned");
        for posting in postings {
            by_shard
                .entry(shard_of_fp(posting.fp))
                .or_default()
                .entry(posting.fp)
                .or_default()
                .push(*posting);
        }
        drop(by_shard);
        self.postings_by_doc
            .write()
            .expect("lock poisoned")
            .entry(doc_id)
            .or_default()
            .extend_from_slice(postings);
        Ok(())
    }

    fn postings_delete(&self, doc_id: u64) -> Result<(), IndexError> {
        let removed = self
            .postings_by_doc
            .write()
            .expect("lock poisoned")
            .remove(&doc_id)
            .unwrap_or_default();
        if removed.is_empty() {
            return Ok(());
        }
        let shards: HashSet<u8> = removed.iter().map(|p| shard_of_fp(p.fp)).collect();
        let mut by_shard = self.postings.write().expect("lock poisoned");
        for shard in shards {
            if let Some(fp_map) = by_shard.get_mut(&shard) {
                for bucket in fp_map.values_mut() {
                    bucket.retain(|p| p.doc_id != doc_id);
                }
            }
        }
        Ok(())
    }

    fn postings_recall(&self, shard: u8, fps: &[i64]) -> Result<Vec<Posting>, IndexError> {
        let by_shard = self.postings.read().expect("lock poisoned");
        let Some(fp_map) = by_shard.get(&shard) else {
            return Ok(Vec::new());
        };
        Ok(fps
            .iter()
            .filter_map(|fp| fp_map.get(fp))
            .flatten()
            .copied()
            .collect())
    }

    fn postings_fetch_for_doc(&self, doc_id: u64, fps: &[i64]) -> Result<Vec<Posting>, IndexError> {
        let wanted: HashSet<i64> = fps.iter().copied().collect();
        Ok(self
            .postings_by_doc
            .read()
            .expect("lock poisoned")
            .get(&doc_id)
            .map(|postings| {
                postings
                    .iter()
                    .filter(|p| wanted.contains(&p.fp))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn doc_stat_put(&self, doc_id: u64, stat: DocStat) -> Result<(), IndexError> {
        self.doc_stats.write().expect("lock poisoned").insert(doc_id, stat);
        Ok(())
    }

    fn doc_stat_get(&self, doc_id: u64) -> Result<Option<DocStat>, IndexError> {
        Ok(self.doc_stats.read().expect("lock poisoned").get(&doc_id).copied())
    }

    fn doc_stat_delete(&self, doc_id: u64) -> Result<(), IndexError> {
        self.doc_stats.write().expect("lock poisoned").remove(&doc_id);
        Ok(())
    }
}
