use std::time::Instant;

use fingerprint::{hamming_distance, split_into_chunks, SimHashEngine};
use index::{Index, SimHashRecord};

use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::types::{format_line_range_spaced, format_percent, DocumentMetadataProvider, SimHashMatch, SimHashReport};

const SIMHASH_REPORT_DETAIL_CAP: usize = 50;

/// Runs the coarse SimHash chunk-matching pipeline (`/api/duplicate-check`):
/// cut the input into overlapping line windows, hash each window, recall
/// band-sharing candidates, and keep the closest match under the Hamming
/// threshold per chunk.
pub fn check_simhash(
    index: &Index,
    metadata: &dyn DocumentMetadataProvider,
    cfg: &MatchConfig,
    filename: &str,
    code: &str,
) -> Result<SimHashReport, MatchError> {
    let start_time = Instant::now();
    let total_lines = code.split('\n').count();

    let engine = SimHashEngine::new(cfg.simhash);
    let chunks = split_into_chunks(code, &cfg.chunk);

    let mut details = Vec::new();
    let mut suspicious_lines = std::collections::BTreeSet::new();

    for chunk in &chunks {
        let chunk_fp = engine.compute(&chunk.content);
        let candidates = index.simhash_recall(chunk_fp)?;

        let mut best: Option<(u32, &SimHashRecord)> = None;
        for candidate in &candidates {
            let dist = hamming_distance(chunk_fp, candidate.fp);
            if dist > cfg.simhash_hamming_threshold {
                continue;
            }
            if best.as_ref().map_or(true, |(best_dist, _)| dist < *best_dist) {
                best = Some((dist, candidate));
            }
        }

        if let Some((dist, record)) = best {
            let project = metadata.project_name(record.doc_id).unwrap_or_default();
            let similarity = 1.0 - (dist as f64 / cfg.simhash.width as f64);
            details.push(SimHashMatch {
                input_lines: format_line_range_spaced(chunk.start_line, chunk.end_line),
                match_project: project,
                match_order_id: record.doc_id,
                match_lines: format_line_range_spaced(record.start_line, record.end_line),
                similarity_score: format!("{:.1}%", similarity * 100.0),
            });

            for line in chunk.start_line..=chunk.end_line {
                suspicious_lines.insert(line);
            }
        }
    }

    let duplicate_rate = if total_lines > 0 {
        suspicious_lines.len() as f64 / total_lines as f64
    } else {
        0.0
    };

    // Capped independently of `cfg.max_details`, which governs the
    // winnowing report instead.
    details.truncate(SIMHASH_REPORT_DETAIL_CAP);

    Ok(SimHashReport {
        filename: filename.to_string(),
        total_lines,
        duplicate_rate: format_percent(duplicate_rate),
        process_time: format!("{:.2}s", start_time.elapsed().as_secs_f64()),
        details,
    })
}
