use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::error::ApiError;
use crate::scanner::PortScanner;
use crate::services::metrics::CpuHistory;
use crate::traffic::{CaptureRegistry, InterfaceEnumerator, WorkerBoard};

pub mod interfaces;
pub mod packets;
pub mod scan;
pub mod system;

/// Handles shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CaptureRegistry>,
    pub workers: Arc<WorkerBoard>,
    pub cpu: Arc<CpuHistory>,
    pub scanner: PortScanner,
    pub interfaces: Arc<dyn InterfaceEnumerator>,
    /// Parent of every scan's cancellation token.
    pub shutdown: CancellationToken,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/packets", get(packets::all_packets))
        .route("/api/packets/:interface", get(packets::interface_packets))
        .route("/api/system", get(system::get_system))
        .route("/api/scan", get(scan::scan_query).post(scan::scan_body))
        .route("/api/interfaces", get(interfaces::list_interfaces))
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn root() -> Json<Value> {
    Json(json!({
        "system": "netpulse",
        "status": "operational",
        "modules": {
            "capture": "active",
            "metrics": "active",
            "scanner": "standing_by"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
