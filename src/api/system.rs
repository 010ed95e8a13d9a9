use axum::{extract::State, Json};

use crate::api::AppState;
use crate::services::metrics::CpuSnapshot;

pub async fn get_system(State(state): State<AppState>) -> Json<CpuSnapshot> {
    Json(state.cpu.snapshot())
}
