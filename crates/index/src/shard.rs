//! 64-way sharding of the winnowing posting index.
//!
//! Sharding exists to bound the cost of a recall query: instead of one
//! `fp IN (...)` scan across every posting ever written, a query's
//! fingerprints are grouped by shard first so each shard only has to
//! consider the subset that could possibly hash into it.

pub use fingerprint::shard_of_fp;

pub const NUM_SHARDS: usize = 64;

pub(crate) fn table_name(shard: u8) -> String {
    format!("postings_{shard:02x}")
}

/// Groups fingerprints by their shard id, preserving each fingerprint's
/// relative order within its shard's bucket.
pub fn group_by_shard(fps: &[i64]) -> hashbrown::HashMap<u8, Vec<i64>> {
    let mut out: hashbrown::HashMap<u8, Vec<i64>> = hashbrown::HashMap::new();
    for &fp in fps {
        out.entry(shard_of_fp(fp)).or_default().push(fp);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_zero_padded_hex() {
        assert_eq!(table_name(0), "postings_00");
        assert_eq!(table_name(63), "postings_3f");
    }

    #[test]
    fn group_by_shard_partitions_all_inputs() {
        let fps = [1i64, 2, 3, 64, 65, -1];
        let grouped = group_by_shard(&fps);
        let total: usize = grouped.values().map(|v| v.len()).sum();
        assert_eq!(total, fps.len());
    }

    #[test]
    fn every_shard_id_is_in_range() {
        for fp in [-100i64, -1, 0, 1, 100, i64::MIN, i64::MAX] {
            assert!((shard_of_fp(fp) as usize) < NUM_SHARDS);
        }
    }
}
