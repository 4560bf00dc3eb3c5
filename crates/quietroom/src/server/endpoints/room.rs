//! Room lookup: card, active meetings and the laid-out week grid.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::room::RoomCard;
use crate::schedule::{layout_week, sanitize_and_format, DisplayEvent, WeekLayout};
use crate::search::LoadState;
use crate::server::types::ApiErrorType;
use crate::server::util::normalize_room;
use crate::types::RoomFinderState;
use crate::upstream::QuietRoomError;

const INVALID_INPUT_MESSAGE: &str = "Invalid input. Please try again!";
const ROOM_NOT_FOUND_MESSAGE: &str = "This room does not exist. Please try again!";
const ROOM_ERROR_MESSAGE: &str = "Failed to load this room. Please try again later!";

/// Query form of the room lookup, as submitted by the search box.
#[derive(Debug, Deserialize)]
pub struct RoomQueryParams {
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub num: String,
}

#[derive(Debug, Serialize)]
pub struct RoomResponse<'a> {
    pub card: LoadState<RoomCard>,
    pub events: &'a [DisplayEvent],
    pub schedule: Option<WeekLayout<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// GET /room/:building/:room
pub async fn get_room(
    Path((building, room)): Path<(String, String)>,
    State(s): State<Arc<RoomFinderState>>,
) -> Response {
    info!("GET /room/{}/{}", building, room);
    lookup_room(&s, &building, &room).await
}

/// GET /room?building=&num=
pub async fn get_room_by_query(
    Query(params): Query<RoomQueryParams>,
    State(s): State<Arc<RoomFinderState>>,
) -> Response {
    info!("GET /room?building={}&num={}", params.building, params.num);
    lookup_room(&s, &params.building, &params.num).await
}

async fn lookup_room(s: &RoomFinderState, building: &str, room: &str) -> Response {
    let (building, room) = match normalize_room(building, room) {
        Ok(parts) => parts,
        Err(e) => {
            return ApiErrorType::from((
                StatusCode::BAD_REQUEST,
                INVALID_INPUT_MESSAGE,
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    let info = match s.client.get_room(&building, &room).await {
        Ok(info) => info,
        Err(e) => return room_error_response(&building, &room, e),
    };

    let events = sanitize_and_format(&info.events, Local::now().date_naive());
    let schedule = layout_week(&events, &s.layout);
    info!(
        building = %building,
        room = %room,
        events = events.len(),
        placed = schedule.placement_count(),
        "Room loaded"
    );

    let body = RoomResponse {
        card: LoadState::Loaded(RoomCard::from_info(&info)),
        events: &events,
        schedule: Some(schedule),
        error: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn room_error_response(building: &str, room: &str, e: QuietRoomError) -> Response {
    let (status, message) = match &e {
        QuietRoomError::NotFound { .. } => {
            warn!(building = %building, room = %room, "Room not found");
            (StatusCode::NOT_FOUND, ROOM_NOT_FOUND_MESSAGE)
        }
        QuietRoomError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, INVALID_INPUT_MESSAGE),
        _ => {
            error!(building = %building, room = %room, error = %e, "Room lookup failed");
            (StatusCode::BAD_GATEWAY, ROOM_ERROR_MESSAGE)
        }
    };

    let body = RoomResponse {
        card: LoadState::from(Err(e)),
        events: &[],
        schedule: None,
        error: Some(message),
    };
    (status, Json(body)).into_response()
}
