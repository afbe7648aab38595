use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use matcher::{check_simhash, check_winnow};

use crate::error::ServerError;
use crate::state::ServerState;

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

async fn take_file_field(multipart: &mut Multipart) -> Result<Upload, ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(e.to_string()))?
                .to_vec();
            return Ok(Upload { filename, bytes });
        }
    }
    Err(ServerError::BadRequest("missing multipart field `file`".to_string()))
}

/// Decodes `bytes` as UTF-8, dropping any invalid byte sequences instead of
/// substituting a replacement character — matches Python's
/// `bytes.decode("utf-8", errors="ignore")`, which the v2 endpoint relies
/// on to tolerate a few stray non-UTF-8 bytes in an otherwise-text upload.
fn decode_utf8_ignore(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                out.push_str(unsafe { std::str::from_utf8_unchecked(valid) });
                let skip = e.error_len().unwrap_or(1).max(1);
                bytes = &rest[skip.min(rest.len())..];
            }
        }
    }
    out
}

/// `POST /api/duplicate-check` — coarse SimHash chunk matching.
///
/// A non-UTF-8 upload is reported as a 200 response carrying an `error`
/// field rather than a 4xx status, matching the original endpoint's
/// contract.
pub async fn duplicate_check(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ServerError> {
    let upload = take_file_field(&mut multipart).await?;

    let code = match String::from_utf8(upload.bytes) {
        Ok(code) => code,
        Err(_) => {
            return Ok(Json(json!({ "error": "文件编码格式错误，请上传 UTF-8 文本文件" })));
        }
    };

    let report = check_simhash(
        &state.index,
        state.store.as_ref(),
        &state.match_config,
        &upload.filename,
        &code,
    )?;

    Ok(Json(serde_json::to_value(report).expect("report serializes")))
}

#[derive(Debug, Deserialize)]
pub struct DuplicateCheckV2Query {
    top_n: Option<usize>,
    exclude_order_ids: Option<String>,
}

fn parse_exclude_ids(raw: Option<&str>) -> HashSet<u64> {
    raw.map(|s| {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .filter_map(|part| part.trim().parse::<u64>().ok())
            .collect()
    })
    .unwrap_or_default()
}

/// `POST /api/duplicate-check-v2` — winnowing offset-alignment matching.
pub async fn duplicate_check_v2(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<DuplicateCheckV2Query>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ServerError> {
    let upload = take_file_field(&mut multipart).await?;
    let code = decode_utf8_ignore(&upload.bytes);
    let exclude = parse_exclude_ids(query.exclude_order_ids.as_deref());
    let top_n = query.top_n.unwrap_or(state.config.default_top_n);

    let report = check_winnow(
        &state.index,
        state.store.as_ref(),
        &state.match_config,
        &upload.filename,
        &code,
        top_n,
        &exclude,
    )?;

    Ok(Json(serde_json::to_value(report).expect("report serializes")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclude_ids_parses_comma_separated_digits_only() {
        let ids = parse_exclude_ids(Some("12,34,abc,56"));
        assert_eq!(ids, HashSet::from([12, 34, 56]));
    }

    #[test]
    fn exclude_ids_is_empty_for_none_or_blank() {
        assert!(parse_exclude_ids(None).is_empty());
        assert!(parse_exclude_ids(Some("")).is_empty());
    }

    #[test]
    fn decode_utf8_ignore_drops_invalid_bytes_and_keeps_valid_ones() {
        let bytes = b"good \xFF bytes";
        let decoded = decode_utf8_ignore(bytes);
        assert_eq!(decoded, "good  bytes");
    }

    #[test]
    fn decode_utf8_ignore_is_identity_for_valid_utf8() {
        assert_eq!(decode_utf8_ignore("hello world".as_bytes()), "hello world");
    }
}
