use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::types::RoomFinderState;

/// GET /health
pub async fn get_health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// GET /buildings
/// Returns the buildings the free-room search covers, in display order
pub async fn get_buildings(State(s): State<Arc<RoomFinderState>>) -> Response {
    info!("GET /buildings");
    Json(&s.config.buildings).into_response()
}
