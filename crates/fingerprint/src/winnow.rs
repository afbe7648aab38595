use blake2::digest::{consts::U8, Digest};
use blake2::Blake2b;
use serde::{Deserialize, Serialize};

use crate::config::WinnowConfig;

type Blake2b64 = Blake2b<U8>;

/// One selected fingerprint from a winnowed token stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fingerprint {
    /// Signed 64-bit hash of the winning k-gram, stored signed so it fits
    /// a SQL `BIGINT` column untouched downstream.
    pub fp: i64,
    /// Index of the winning k-gram's first token within the input token
    /// stream — used to align an input document against an indexed one.
    pub pos: usize,
    pub start_line: u32,
    pub end_line: u32,
}

/// The low 6 bits of a fingerprint's unsigned bit pattern, used to place it
/// into one of 64 posting-index shards. Reinterpreting the signed value as
/// unsigned before masking keeps the distribution uniform regardless of
/// sign.
pub fn shard_of_fp(fp: i64) -> u8 {
    (fp as u64 & 0x3F) as u8
}

fn kgram_hash(tokens: &[String], start: usize, k: usize) -> i64 {
    let joined = tokens[start..start + k].join("\u{1f}");
    let digest = Blake2b64::digest(joined.as_bytes());
    let unsigned = u64::from_be_bytes(digest.as_slice().try_into().expect("8-byte digest"));
    unsigned as i64
}

/// Winnows a normalized token stream into a sparse set of representative
/// k-gram fingerprints (Schleimer/Wilkerson/Aiken).
///
/// Every `cfg.window`-wide run of consecutive k-gram hashes contributes its
/// leftmost minimum; a fingerprint is only emitted when the selected
/// position or value changes from the previous window, which is what keeps
/// the output sparse instead of one entry per window.
pub fn winnow(tokens: &[String], token_lines: &[u32], cfg: &WinnowConfig) -> Vec<Fingerprint> {
    let k = cfg.k;
    let window = cfg.window;
    if tokens.len() < k {
        return Vec::new();
    }

    let hash_count = tokens.len() - k + 1;
    let hashes: Vec<i64> = (0..hash_count).map(|i| kgram_hash(tokens, i, k)).collect();

    let mut fps = Vec::new();
    let mut last_idx: Option<usize> = None;
    let mut last_val: Option<i64> = None;

    if hashes.len() < window {
        return fps;
    }

    for i in 0..=hashes.len() - window {
        let win = &hashes[i..i + window];
        let (rel_j, &min_val) = win
            .iter()
            .enumerate()
            .min_by_key(|&(_, &v)| v)
            .expect("window is non-empty");
        let j = i + rel_j;

        if last_idx != Some(j) || last_val != Some(min_val) {
            let start_line = token_lines[j];
            let end_line = token_lines[(j + k - 1).min(token_lines.len() - 1)];
            fps.push(Fingerprint {
                fp: min_val,
                pos: j,
                start_line,
                end_line,
            });
            last_idx = Some(j);
            last_val = Some(min_val);
        }
    }

    fps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> (Vec<String>, Vec<u32>) {
        let tokens = words.iter().map(|w| w.to_string()).collect();
        let lines = (1..=words.len() as u32).collect();
        (tokens, lines)
    }

    #[test]
    fn fewer_tokens_than_k_yields_nothing() {
        let (tokens, lines) = toks(&["a", "b"]);
        let cfg = WinnowConfig { k: 5, window: 2 };
        assert!(winnow(&tokens, &lines, &cfg).is_empty());
    }

    #[test]
    fn identical_token_streams_winnow_identically() {
        let (tokens, lines) = toks(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let cfg = WinnowConfig { k: 3, window: 2 };
        assert_eq!(winnow(&tokens, &lines, &cfg), winnow(&tokens, &lines, &cfg));
    }

    #[test]
    fn emits_at_least_one_fingerprint_when_windows_exist() {
        let (tokens, lines) = toks(&["a", "b", "c", "d", "e", "f"]);
        let cfg = WinnowConfig { k: 3, window: 2 };
        let fps = winnow(&tokens, &lines, &cfg);
        assert!(!fps.is_empty());
    }

    #[test]
    fn consecutive_identical_selections_are_not_duplicated() {
        // A run of identical tokens produces identical k-gram hashes, so
        // the same (pos, val) should be selected repeatedly and only
        // emitted once per the emit-on-change rule.
        let (tokens, lines) = toks(&["x", "x", "x", "x", "x", "x", "x", "x"]);
        let cfg = WinnowConfig { k: 2, window: 3 };
        let fps = winnow(&tokens, &lines, &cfg);
        for pair in fps.windows(2) {
            assert!(pair[0].pos != pair[1].pos || pair[0].fp != pair[1].fp);
        }
    }

    #[test]
    fn shard_of_fp_stays_in_range() {
        for fp in [-1i64, 0, 1, i64::MIN, i64::MAX, 12345, -98765] {
            assert!(shard_of_fp(fp) < 64);
        }
    }

    #[test]
    fn shard_of_fp_is_deterministic() {
        assert_eq!(shard_of_fp(42), shard_of_fp(42));
    }
}
