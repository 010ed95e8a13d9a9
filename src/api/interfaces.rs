use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::AppState;
use crate::error::ApiError;
use crate::traffic::WorkerStatus;

#[derive(Serialize)]
pub struct InterfaceView {
    pub name: String,
    /// `None` when no worker was started for this interface.
    pub worker: Option<WorkerStatus>,
}

#[derive(Serialize)]
pub struct InterfacesResponse {
    pub interfaces: Vec<InterfaceView>,
}

pub async fn list_interfaces(
    State(state): State<AppState>,
) -> Result<Json<InterfacesResponse>, ApiError> {
    let enumerator = state.interfaces.clone();
    // device enumeration goes through libpcap and may block
    let names = tokio::task::spawn_blocking(move || enumerator.list())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let mut workers = state.workers.snapshot();
    let mut interfaces: Vec<InterfaceView> = names
        .into_iter()
        .map(|name| {
            let worker = workers.remove(&name);
            InterfaceView { name, worker }
        })
        .collect();
    // workers whose device is no longer enumerated, e.g. an unplugged adapter
    interfaces.extend(workers.into_iter().map(|(name, status)| InterfaceView {
        name,
        worker: Some(status),
    }));

    Ok(Json(InterfacesResponse { interfaces }))
}
