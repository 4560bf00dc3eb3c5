use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::server::endpoints::{availability, room, status};
use crate::types::RoomFinderState;

mod endpoints;
mod types;
pub mod util;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<RoomFinderState>) -> Router {
    let room_router = Router::new()
        .route("/room", get(room::get_room_by_query))
        .route("/room/:building/:room", get(room::get_room));

    let availability_router = Router::new()
        .route("/availability", get(availability::get_availability))
        .route("/availability/latest", get(availability::get_latest));

    Router::new()
        .route("/health", get(status::get_health))
        .route("/buildings", get(status::get_buildings))
        .merge(room_router)
        .merge(availability_router)
        .with_state(app_state)
}
