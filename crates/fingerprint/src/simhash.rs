use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SimHashConfig;

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("static regex"));
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//[^\n]*").expect("static regex"));
static ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("static regex"));

/// Coarse-grained SimHash over a chunk of source text.
///
/// This is deliberately cruder than [`tokenizer::tokenize`]: it strips
/// comments, lowercases everything, and keeps only alphanumeric runs as
/// tokens. No keyword table, no literal sentinels. The chunk pipeline
/// relies on SimHash's bit-flip tolerance to absorb that noise rather than
/// on precise normalization — it's comparing whole chunks for rough
/// similarity, not hunting for an exact k-gram match.
#[derive(Debug, Clone, Copy)]
pub struct SimHashEngine {
    cfg: SimHashConfig,
}

impl SimHashEngine {
    pub fn new(cfg: SimHashConfig) -> Self {
        Self { cfg }
    }

    /// Computes the 64-bit SimHash of `content`. Content with no extractable
    /// tokens hashes to zero — the neutral "no signal" fingerprint, which by
    /// construction has band values that recall nothing useful.
    pub fn compute(&self, content: &str) -> u64 {
        let tokens = clean_tokens(content);
        if tokens.is_empty() {
            return 0;
        }

        let features = ngram_features(&tokens, self.cfg.n_gram);
        let width = self.cfg.width as usize;
        let mut acc = vec![0i64; width];

        for feature in &features {
            let h = hash_feature(feature);
            for (i, slot) in acc.iter_mut().enumerate() {
                if h & (1u64 << i) != 0 {
                    *slot += 1;
                } else {
                    *slot -= 1;
                }
            }
        }

        let mut fp: u64 = 0;
        for (i, &v) in acc.iter().enumerate() {
            if v > 0 {
                fp |= 1u64 << i;
            }
        }
        fp
    }

    /// Splits a 64-bit fingerprint into 4 independently-indexable 16-bit
    /// bands, most-significant first. Two fingerprints within Hamming
    /// distance 3 must share at least one band exactly (pigeonhole: 3 flipped
    /// bits can spoil at most 3 of the 4 bands), which is what makes
    /// disjunctive band recall sound for `hamming_distance <= 3`.
    pub fn split_to_bands(fp: u64) -> [u16; 4] {
        [
            ((fp >> 48) & 0xFFFF) as u16,
            ((fp >> 32) & 0xFFFF) as u16,
            ((fp >> 16) & 0xFFFF) as u16,
            (fp & 0xFFFF) as u16,
        ]
    }
}

/// Number of differing bits between two fingerprints.
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

fn clean_tokens(content: &str) -> Vec<String> {
    let without_block = BLOCK_COMMENT.replace_all(content, "");
    let without_comments = LINE_COMMENT.replace_all(&without_block, "");
    let lowered = without_comments.to_lowercase();
    ALNUM_RUN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn ngram_features(tokens: &[String], n: usize) -> Vec<String> {
    if tokens.len() < n {
        return vec![tokens.join(" ")];
    }
    (0..=tokens.len() - n)
        .map(|i| tokens[i..i + n].join(" "))
        .collect()
}

/// MD5-hashes `feature` and returns the low 64 bits of the digest,
/// big-endian. The original engine treats the full digest as one large
/// integer and only ever tests bit positions 0..63 against it, which is
/// equivalent to just keeping the digest's low 8 bytes.
fn hash_feature(feature: &str) -> u64 {
    let digest = Md5::digest(feature.as_bytes());
    u64::from_be_bytes(digest[8..16].try_into().expect("md5 digest is 16 bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_hashes_to_zero() {
        let engine = SimHashEngine::new(SimHashConfig::default());
        assert_eq!(engine.compute(""), 0);
        assert_eq!(engine.compute("   \n  "), 0);
    }

    #[test]
    fn identical_content_hashes_identically() {
        let engine = SimHashEngine::new(SimHashConfig::default());
        let code = "function add(a, b) { return a + b; }";
        assert_eq!(engine.compute(code), engine.compute(code));
    }

    #[test]
    fn comment_only_differences_do_not_change_the_hash() {
        let engine = SimHashEngine::new(SimHashConfig::default());
        let a = "int total = a + b; // running total";
        let b = "int total = a + b; /* running total */";
        assert_eq!(engine.compute(a), engine.compute(b));
    }

    #[test]
    fn hamming_distance_is_symmetric_and_zero_for_equal_inputs() {
        assert_eq!(hamming_distance(0xABCD, 0xABCD), 0);
        assert_eq!(hamming_distance(0xABCD, 0x1234), hamming_distance(0x1234, 0xABCD));
    }

    #[test]
    fn hamming_distance_counts_bit_flips() {
        assert_eq!(hamming_distance(0b0000, 0b0001), 1);
        assert_eq!(hamming_distance(0b0000, 0b1111), 4);
    }

    #[test]
    fn bands_round_trip_to_the_original_fingerprint() {
        let fp = 0x1122_3344_5566_7788u64;
        let bands = SimHashEngine::split_to_bands(fp);
        let rebuilt = (bands[0] as u64) << 48
            | (bands[1] as u64) << 32
            | (bands[2] as u64) << 16
            | (bands[3] as u64);
        assert_eq!(rebuilt, fp);
    }

    #[test]
    fn near_identical_chunks_stay_within_hamming_threshold() {
        let engine = SimHashEngine::new(SimHashConfig::default());
        let a = "function computeTotal(price, tax) { return price + tax; }";
        let b = "function computeTotal(price, tax) { return price+tax; }";
        assert!(hamming_distance(engine.compute(a), engine.compute(b)) <= 3);
    }
}
