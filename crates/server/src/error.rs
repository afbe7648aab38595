use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use index::IndexError;
use matcher::MatchError;
use rebuild::RebuildError;

/// Errors surfaced at the HTTP boundary.
///
/// Decode failures on `/api/duplicate-check` are deliberately NOT modeled
/// here: that endpoint reports a malformed upload as a 200 response with
/// an `error` field, matching the contract callers already depend on, so
/// the handler builds that response directly rather than routing it
/// through this type.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("request body exceeds the configured size limit")]
    PayloadTooLarge,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Rebuild(#[from] RebuildError),
}

impl From<config::ConfigError> for ServerError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Match(MatchError::Decode) => StatusCode::BAD_REQUEST,
            Self::Match(MatchError::Index(_)) | Self::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rebuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate_limited",
            Self::PayloadTooLarge => "payload_too_large",
            Self::BadRequest(_) => "bad_request",
            Self::Match(MatchError::Decode) => "invalid_encoding",
            Self::Match(MatchError::Index(_)) | Self::Index(_) => "index_error",
            Self::Rebuild(_) => "rebuild_error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}
