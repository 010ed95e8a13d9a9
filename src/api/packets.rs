use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::AppState;
use crate::traffic::PacketRecord;

pub async fn all_packets(State(state): State<AppState>) -> Response {
    let snapshot = state.registry.snapshot_all();
    if snapshot.is_empty() {
        return Json(json!({ "message": "No packets captured yet." })).into_response();
    }
    Json(snapshot).into_response()
}

pub async fn interface_packets(
    State(state): State<AppState>,
    Path(interface): Path<String>,
) -> Json<Vec<PacketRecord>> {
    Json(state.registry.snapshot(&interface))
}
