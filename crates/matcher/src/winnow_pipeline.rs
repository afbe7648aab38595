use std::collections::{HashMap, HashSet};

use fingerprint::{winnow_tokens, Fingerprint};
use index::Index;
use tokenizer::tokenize;

use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::interval::{covered_lines, merge_intervals, Interval};
use crate::types::{
    format_line_range_tight, format_percent, DocumentMetadataProvider, EvidencePair, WinnowMatch, WinnowReport,
};

/// Runs the winnowing offset-alignment pipeline
/// (`/api/duplicate-check-v2`): winnow the input into k-gram fingerprints,
/// recall postings sharing those fingerprints, find each candidate
/// document's best position offset, and report candidates whose aligned
/// coverage clears `cfg.min_coverage`.
pub fn check_winnow(
    index: &Index,
    metadata: &dyn DocumentMetadataProvider,
    cfg: &MatchConfig,
    filename: &str,
    code: &str,
    top_n: usize,
    exclude_doc_ids: &HashSet<u64>,
) -> Result<WinnowReport, MatchError> {
    let total_lines = code.split('\n').count();

    let stream = tokenize(code);
    let mut in_fps = winnow_tokens(&stream.tokens, &stream.lines, &cfg.winnow);

    if in_fps.is_empty() {
        return Ok(empty_report(filename, total_lines));
    }

    if in_fps.len() > cfg.max_query_fps {
        let step = (in_fps.len() / cfg.max_query_fps).max(1);
        in_fps = in_fps
            .iter()
            .step_by(step)
            .take(cfg.max_query_fps)
            .copied()
            .collect();
    }

    let mut in_by_fp: HashMap<i64, Vec<Fingerprint>> = HashMap::new();
    for fp in &in_fps {
        in_by_fp.entry(fp.fp).or_default().push(*fp);
    }
    let fp_values: Vec<i64> = in_fps.iter().map(|f| f.fp).collect();

    let recalled = index.postings_recall(&fp_values, cfg.recall_batch)?;
    let mut hits: HashMap<u64, u32> = HashMap::new();
    for posting in &recalled {
        if exclude_doc_ids.contains(&posting.doc_id) {
            continue;
        }
        *hits.entry(posting.doc_id).or_insert(0) += 1;
    }

    if hits.is_empty() {
        return Ok(empty_report(filename, total_lines));
    }

    let mut ranked: Vec<(u64, u32)> = hits.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let candidates: Vec<u64> = ranked
        .into_iter()
        .map(|(doc_id, _)| doc_id)
        .filter(|doc_id| !exclude_doc_ids.contains(doc_id))
        .take(top_n)
        .collect();

    let mut details = Vec::new();
    let mut all_input_intervals: Vec<Interval> = Vec::new();

    for doc_id in candidates {
        let postings = index.postings_fetch_for_doc(doc_id, &fp_values)?;
        if postings.len() < cfg.min_hit as usize {
            continue;
        }

        let mut offset_counts: HashMap<i64, u32> = HashMap::new();
        for posting in &postings {
            if let Some(inputs) = in_by_fp.get(&posting.fp) {
                for input_fp in inputs {
                    let offset = posting.pos as i64 - input_fp.pos as i64;
                    *offset_counts.entry(offset).or_insert(0) += 1;
                }
            }
        }
        if offset_counts.is_empty() {
            continue;
        }

        // Mode of the offset histogram; ties break toward the smallest
        // offset, matching insertion order of a stable sort on (count desc,
        // offset asc).
        let (best_offset, best_count) = offset_counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .expect("offset_counts is non-empty");
        if best_count < cfg.min_hit {
            continue;
        }

        let mut in_intervals = Vec::new();
        let mut db_intervals = Vec::new();
        for posting in &postings {
            let Some(inputs) = in_by_fp.get(&posting.fp) else { continue };
            for input_fp in inputs {
                let offset = posting.pos as i64 - input_fp.pos as i64;
                if offset != best_offset {
                    continue;
                }
                in_intervals.push((input_fp.start_line, input_fp.end_line));
                db_intervals.push((posting.start_line, posting.end_line));
            }
        }

        let in_merged = merge_intervals(&in_intervals);
        let db_merged = merge_intervals(&db_intervals);

        let coverage = if total_lines > 0 {
            covered_lines(&in_merged) as f64 / total_lines as f64
        } else {
            0.0
        };
        if coverage < cfg.min_coverage {
            continue;
        }

        all_input_intervals.extend(in_merged.iter().copied());

        let evidence = in_merged
            .iter()
            .zip(db_merged.iter())
            .take(cfg.max_evidence_pairs)
            .map(|(&(s1, e1), &(s2, e2))| EvidencePair {
                input_lines: format_line_range_tight(s1, e1),
                match_lines: format_line_range_tight(s2, e2),
            })
            .collect();

        details.push(WinnowMatch {
            match_order_id: doc_id,
            match_project: metadata.project_name(doc_id).unwrap_or_default(),
            hit_fingerprints: best_count,
            coverage: format_percent(coverage),
            evidence,
        });
    }

    let merged_all = merge_intervals(&all_input_intervals);
    let dup_rate = if total_lines > 0 {
        covered_lines(&merged_all) as f64 / total_lines as f64
    } else {
        0.0
    };

    details.truncate(cfg.max_details);

    Ok(WinnowReport {
        filename: filename.to_string(),
        total_lines,
        duplicate_rate: format_percent(dup_rate),
        details,
    })
}

fn empty_report(filename: &str, total_lines: usize) -> WinnowReport {
    WinnowReport {
        filename: filename.to_string(),
        total_lines,
        duplicate_rate: "0.00%".to_string(),
        details: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index::{BackendConfig, DocStat, Posting};

    struct NoMetadata;
    impl DocumentMetadataProvider for NoMetadata {
        fn project_name(&self, _doc_id: u64) -> Option<String> {
            Some("demo-project".to_string())
        }
    }

    fn seeded_index(code: &str, doc_id: u64, cfg: &MatchConfig) -> Index {
        let index = Index::open(&BackendConfig::in_memory()).unwrap();
        let stream = tokenize(code);
        let fps = winnow_tokens(&stream.tokens, &stream.lines, &cfg.winnow);
        let postings: Vec<Posting> = fps
            .iter()
            .map(|f| Posting {
                fp: f.fp,
                doc_id,
                pos: f.pos as u32,
                start_line: f.start_line,
                end_line: f.end_line,
            })
            .collect();
        index
            .replace_document(
                doc_id,
                &[],
                &postings,
                DocStat { fp_count: postings.len() as u32, token_count: stream.len() as u32 },
            )
            .unwrap();
        index
    }

    fn sample_code() -> String {
        (0..80)
            .map(|i| format!("function handler{i}(input) {{ return process(input) + {i}; }}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn identical_document_is_reranked_above_coverage_threshold() {
        let cfg = MatchConfig::default();
        let code = sample_code();
        let index = seeded_index(&code, 7, &cfg);
        let report = check_winnow(&index, &NoMetadata, &cfg, "upload.py", &code, 80, &HashSet::new()).unwrap();
        assert!(report.details.iter().any(|d| d.match_order_id == 7));
    }

    #[test]
    fn excluded_document_ids_never_appear_in_the_report() {
        let cfg = MatchConfig::default();
        let code = sample_code();
        let index = seeded_index(&code, 7, &cfg);
        let mut exclude = HashSet::new();
        exclude.insert(7u64);
        let report = check_winnow(&index, &NoMetadata, &cfg, "upload.py", &code, 80, &exclude).unwrap();
        assert!(!report.details.iter().any(|d| d.match_order_id == 7));
    }

    #[test]
    fn no_fingerprints_short_circuits_to_an_empty_report() {
        let cfg = MatchConfig::default();
        let index = Index::open(&BackendConfig::in_memory()).unwrap();
        let report = check_winnow(&index, &NoMetadata, &cfg, "tiny.py", "x = 1", 80, &HashSet::new()).unwrap();
        assert!(report.details.is_empty());
        assert_eq!(report.duplicate_rate, "0.00%");
    }

    #[test]
    fn unrelated_document_yields_no_hits() {
        let cfg = MatchConfig::default();
        let seed = sample_code();
        let index = seeded_index(&seed, 1, &cfg);
        let unrelated = (0..80)
            .map(|i| format!("totally different line content number {i} with its own words"))
            .collect::<Vec<_>>()
            .join("\n");
        let report = check_winnow(&index, &NoMetadata, &cfg, "other.py", &unrelated, 80, &HashSet::new()).unwrap();
        assert!(report.details.is_empty());
    }
}
