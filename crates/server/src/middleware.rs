use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::ServerState;

const API_KEY_HEADER: &str = "x-api-key";

/// Extracts an API key from `x-api-key` or a `Bearer` `Authorization`
/// header, rejects the request if it's missing, unrecognized, or over its
/// rate limit.
pub async fn api_key_auth(
    State(state): State<Arc<ServerState>>,
    req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            req.headers()
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::to_string)
        })
        .ok_or(ServerError::Unauthorized)?;

    if !state.is_valid_api_key(&key) {
        return Err(ServerError::Unauthorized);
    }
    if !state.check_rate_limit(&key) {
        return Err(ServerError::RateLimited);
    }

    Ok(next.run(req).await)
}

/// Stamps every request with an `x-request-id`, generating one if the
/// caller didn't supply it, and echoes it back on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.headers_mut()
        .insert("x-request-id", HeaderValue::from_str(&id).expect("uuid is valid header value"));

    let mut res = next.run(req).await;
    res.headers_mut()
        .insert("x-request-id", HeaderValue::from_str(&id).expect("uuid is valid header value"));
    res
}

/// Logs one structured line per request: method, path, status, and
/// latency.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let res = next.run(req).await;
    let duration_ms = start.elapsed().as_millis();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = res.status().as_u16(),
        duration_ms,
        request_id,
        "handled request"
    );

    res
}
