//! Free-room search over every configured building.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::search::{AvailabilitySearch, SearchEvent, SearchGuard, SessionKey};
use crate::server::types::ApiErrorType;
use crate::server::util::{availability_query, session_key};
use crate::types::RoomFinderState;
use crate::upstream::{AvailabilityQuery, BuildingOutcome};

/// Form fields of the availability search. Missing fields take defaults.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    pub day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// GET /availability
/// Runs a search and returns the merged result. With a session header the
/// result is also kept for `/availability/latest`
pub async fn get_availability(
    headers: HeaderMap,
    Query(params): Query<AvailabilityParams>,
    State(s): State<Arc<RoomFinderState>>,
) -> Response {
    let query = match availability_query(
        params.day.as_deref(),
        params.start_time.as_deref(),
        params.end_time.as_deref(),
    ) {
        Ok(query) => query,
        Err(e) => {
            return ApiErrorType::from((
                StatusCode::BAD_REQUEST,
                "Invalid search. Please try again!",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    let key = session_key(&headers);
    info!(
        session = %key.as_ref().map_or_else(|| "none".to_string(), ToString::to_string),
        day = %query.day,
        start_time = %query.start_time,
        end_time = %query.end_time,
        "GET /availability"
    );

    let buildings = s.config.buildings.clone();
    match key {
        Some(key) => search_for_session(&s, &key, query, buildings).await,
        None => search_once(&s, query, buildings).await,
    }
}

/// Runs the search in the session's store; a newer search from the same
/// session turns this one into a 409.
async fn search_for_session(
    s: &RoomFinderState,
    key: &SessionKey,
    query: AvailabilityQuery,
    buildings: Vec<String>,
) -> Response {
    let generation = s.sessions.begin(key, query.clone(), buildings.clone());
    let guard = SearchGuard::new(&s.sessions, key, generation);

    s.client
        .search_availability(&buildings, &query, |outcome| {
            s.sessions.apply(key, outcome_event(generation, outcome));
        })
        .await;
    guard.complete();

    match s.sessions.snapshot(key) {
        Some(search) if search.generation() == generation => {
            (StatusCode::OK, Json(search.view())).into_response()
        }
        _ => {
            warn!(session = %key, generation, "Search superseded by a newer one");
            ApiErrorType::from((
                StatusCode::CONFLICT,
                "This search was replaced by a newer one",
                Some(format!("generation {generation}")),
            ))
            .into_response()
        }
    }
}

/// Runs a search nobody else can see or supersede.
async fn search_once(
    s: &RoomFinderState,
    query: AvailabilityQuery,
    buildings: Vec<String>,
) -> Response {
    let generation = s.sessions.next_generation();
    let mut search = AvailabilitySearch::default().apply(SearchEvent::Started {
        generation,
        query: query.clone(),
        buildings: buildings.clone(),
    });

    s.client
        .search_availability(&buildings, &query, |outcome| {
            search = std::mem::take(&mut search).apply(outcome_event(generation, outcome));
        })
        .await;

    (StatusCode::OK, Json(search.view())).into_response()
}

fn outcome_event(generation: u64, outcome: BuildingOutcome) -> SearchEvent {
    match outcome.result {
        Ok(rooms) => SearchEvent::BuildingResolved {
            generation,
            building: outcome.building,
            rooms,
        },
        Err(e) => SearchEvent::BuildingFailed {
            generation,
            building: outcome.building,
            reason: e.to_string(),
        },
    }
}

/// GET /availability/latest
/// Returns the session's current search without starting a new one
pub async fn get_latest(headers: HeaderMap, State(s): State<Arc<RoomFinderState>>) -> Response {
    let key = session_key(&headers);
    let search = match &key {
        Some(key) => {
            info!(session = %key, "GET /availability/latest");
            s.sessions.snapshot(key).unwrap_or_default()
        }
        None => {
            info!("GET /availability/latest");
            AvailabilitySearch::default()
        }
    };

    (StatusCode::OK, Json(search.view())).into_response()
}
