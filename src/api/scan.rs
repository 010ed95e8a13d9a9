use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::{ApiError, ScanError};
use crate::scanner::{PortSet, ScanRequest};

#[derive(Deserialize)]
pub struct ScanBody {
    pub target: Option<String>,
    pub ports: Option<Vec<i64>>,
}

#[derive(Deserialize)]
pub struct ScanQuery {
    pub ip: Option<String>,
    /// e.g. `22,80,8000-8100`
    pub ports: Option<String>,
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub target: String,
    pub open_ports: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn scan_body(
    State(state): State<AppState>,
    payload: Result<Json<ScanBody>, JsonRejection>,
) -> Result<Json<ScanResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let ports = body.ports.as_deref().map(PortSet::from_values).transpose()?;
    let request = ScanRequest::new(body.target.as_deref(), ports)?;
    run_scan(&state, request).await
}

pub async fn scan_query(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ScanResponse>, ApiError> {
    let ports = query
        .ports
        .as_deref()
        .filter(|spec| !spec.trim().is_empty())
        .map(str::parse::<PortSet>)
        .transpose()?;
    let request = ScanRequest::new(query.ip.as_deref(), ports)?;
    run_scan(&state, request).await
}

async fn run_scan(state: &AppState, request: ScanRequest) -> Result<Json<ScanResponse>, ApiError> {
    let result = state
        .scanner
        .scan(&request, state.shutdown.child_token())
        .await
        .map_err(|e| {
            if matches!(e, ScanError::Cancelled | ScanError::Internal(_)) {
                tracing::error!("Error in scanning ports: {}", e);
            }
            ApiError::from(e)
        })?;

    let message = result
        .open_ports
        .is_empty()
        .then(|| "No open ports found".to_string());

    Ok(Json(ScanResponse {
        target: result.target,
        open_ports: result.open_ports,
        message,
    }))
}
