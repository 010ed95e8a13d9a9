use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to enumerate interfaces: {0}")]
    Enumerate(String),
    #[error("failed to open capture on {interface}: {reason}")]
    Open { interface: String, reason: String },
    #[error("capture read failed: {0}")]
    Read(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("frame has no ethernet header")]
    NoLinkLayer,
}

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("cpu statistics unavailable")]
    Unavailable,
    #[error("invalid cpu sample: {0}")]
    InvalidSample(f32),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScanError {
    #[error("target is required")]
    MissingTarget,
    #[error("could not resolve target {0}")]
    Unresolvable(String),
    #[error("invalid port {0}: ports must be in 1-65535")]
    InvalidPort(i64),
    #[error("invalid port specification: {0}")]
    InvalidPortSpec(String),
    #[error("scan cancelled")]
    Cancelled,
    #[error("port scan failed: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Errors surfaced to HTTP callers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::MissingTarget
            | ScanError::Unresolvable(_)
            | ScanError::InvalidPort(_)
            | ScanError::InvalidPortSpec(_) => ApiError::BadRequest(err.to_string()),
            ScanError::Cancelled | ScanError::Internal(_) => {
                ApiError::Internal("Port scan failed.".to_string())
            }
        }
    }
}

impl From<CaptureError> for ApiError {
    fn from(err: CaptureError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
