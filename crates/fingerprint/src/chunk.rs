use serde::{Deserialize, Serialize};

use crate::config::ChunkConfig;

/// One line-range slice of source text, ready to be SimHashed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based, inclusive.
    pub start_line: u32,
    /// 1-based, inclusive.
    pub end_line: u32,
    pub content: String,
}

/// Cuts `code` into overlapping line windows per `cfg`.
///
/// Windows advance by `cfg.step` lines regardless of `cfg.window_size`, so
/// consecutive windows overlap whenever `step < window_size`. Chunks whose
/// trimmed content falls under `cfg.min_chunk_len` bytes are dropped — they
/// carry too little signal for a SimHash comparison to mean anything.
pub fn split_into_chunks(code: &str, cfg: &ChunkConfig) -> Vec<Chunk> {
    let lines: Vec<&str> = code.split('\n').collect();
    let total_lines = lines.len();
    let mut chunks = Vec::new();

    let mut start = 0usize;
    loop {
        let end = (start + cfg.window_size).min(total_lines);
        if start >= end {
            break;
        }

        let content = lines[start..end].join("\n");
        if content.trim().len() >= cfg.min_chunk_len {
            chunks.push(Chunk {
                start_line: (start + 1) as u32,
                end_line: end as u32,
                content,
            });
        }

        if end == total_lines {
            break;
        }
        start += cfg.step;
    }

    chunks
}
