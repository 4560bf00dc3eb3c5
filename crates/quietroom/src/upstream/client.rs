//! HTTP client for the QuietRoom API.
//!
//! Two read-only endpoints are used:
//! 1. `GET /building/{building}/room/{room}` for a room's details and meetings
//! 2. `GET /availability/{building}?day=..&startTime=..&endTime=..` for the
//!    rooms of one building that are free in a window

use super::error::QuietRoomError;
use super::types::{AvailabilityQuery, RoomInfo};
use futures::stream::{FuturesUnordered, StreamExt};
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Base URL of the hosted QuietRoom API.
pub const QUIETROOM_BASE_URL: &str = "https://uah.quietroom.app";

/// Configuration for the QuietRoom client.
#[derive(Debug, Clone)]
pub struct QuietRoomConfig {
    /// Base URL of the API
    pub base_url: String,
    /// Maximum time for a whole request
    pub request_timeout: Duration,
    /// Maximum time to establish a connection
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for QuietRoomConfig {
    fn default() -> Self {
        Self {
            base_url: QUIETROOM_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("quietroom/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Outcome of the availability request for one building.
#[derive(Debug, Clone)]
pub struct BuildingOutcome {
    pub building: String,
    pub result: Result<Vec<String>, QuietRoomError>,
}

/// Client for the QuietRoom room and availability API.
#[derive(Debug, Clone)]
pub struct QuietRoomClient {
    client: Client,
    base_url: Url,
}

impl QuietRoomClient {
    /// Creates a new client with default configuration.
    pub fn new() -> Result<Self, QuietRoomError> {
        Self::with_config(QuietRoomConfig::default())
    }

    /// Creates a new client with custom configuration.
    pub fn with_config(config: QuietRoomConfig) -> Result<Self, QuietRoomError> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(QuietRoomError::UrlError {
                message: format!("{} cannot be used as a base URL", config.base_url),
            });
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| QuietRoomError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches a room's details and all of its scheduled meetings.
    ///
    /// # Arguments
    /// * `building` - Building code, e.g. `OKT`
    /// * `room` - Room number, e.g. `N155`
    ///
    /// # Returns
    /// * `Ok(RoomInfo)` - The room as the API describes it
    /// * `Err(QuietRoomError::NotFound)` - If the building or room does not exist
    /// * `Err(QuietRoomError)` - Any other failure
    pub async fn get_room(&self, building: &str, room: &str) -> Result<RoomInfo, QuietRoomError> {
        let (building, room) = (building.trim(), room.trim());
        if building.is_empty() || room.is_empty() {
            return Err(QuietRoomError::InvalidInput {
                message: "building and room number are required".to_string(),
            });
        }

        let correlation_id = generate_correlation_id();
        let url = self.endpoint(&["building", building, "room", room])?;

        info!(
            correlation_id = %correlation_id,
            url = %url,
            "Fetching room info"
        );

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let room_info: RoomInfo = decode(response, &format!("{building} {room}")).await?;

        info!(
            correlation_id = %correlation_id,
            events = room_info.events.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Received room info"
        );

        Ok(room_info)
    }

    /// Fetches the rooms of one building that are free during the query window.
    ///
    /// An empty list is a normal answer, not an error.
    pub async fn get_availability(
        &self,
        building: &str,
        query: &AvailabilityQuery,
    ) -> Result<Vec<String>, QuietRoomError> {
        let correlation_id = generate_correlation_id();
        let mut url = self.endpoint(&["availability", building])?;
        url.query_pairs_mut()
            .append_pair("day", &query.day)
            .append_pair("startTime", &query.start_time)
            .append_pair("endTime", &query.end_time);

        debug!(
            correlation_id = %correlation_id,
            url = %url,
            "Fetching availability"
        );

        let response = self.client.get(url).send().await?;
        let rooms: Vec<String> = decode(response, building).await?;

        if rooms.is_empty() {
            debug!(
                correlation_id = %correlation_id,
                building = %building,
                "No free rooms in building"
            );
        }

        Ok(rooms)
    }

    /// Queries every building at once and reports each outcome as it arrives.
    ///
    /// All requests are in flight together; outcomes are handed to
    /// `on_outcome` in completion order, not in `buildings` order.
    pub async fn search_availability<F>(
        &self,
        buildings: &[String],
        query: &AvailabilityQuery,
        mut on_outcome: F,
    ) where
        F: FnMut(BuildingOutcome),
    {
        let start = Instant::now();
        let mut pending: FuturesUnordered<_> = buildings
            .iter()
            .map(|building| async move {
                BuildingOutcome {
                    building: building.clone(),
                    result: self.get_availability(building, query).await,
                }
            })
            .collect();

        let mut failures = 0usize;
        while let Some(outcome) = pending.next().await {
            if let Err(e) = &outcome.result {
                failures += 1;
                warn!(
                    building = %outcome.building,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Availability request failed"
                );
            }
            on_outcome(outcome);
        }

        info!(
            buildings = buildings.len(),
            failures = failures,
            duration_ms = start.elapsed().as_millis() as u64,
            "Availability fan-out finished"
        );
    }

    /// Builds `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, QuietRoomError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| QuietRoomError::UrlError {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Maps the response status onto [`QuietRoomError`] and decodes the JSON body.
async fn decode<T: DeserializeOwned>(
    response: Response,
    resource: &str,
) -> Result<T, QuietRoomError> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(QuietRoomError::NotFound {
            resource: resource.to_string(),
        }),
        status if !status.is_success() => {
            let message = response.text().await.unwrap_or_default();
            Err(QuietRoomError::UnexpectedResponse {
                status: status.as_u16(),
                message,
            })
        }
        _ => {
            let text = response.text().await?;
            Ok(serde_json::from_str(&text)?)
        }
    }
}

/// Generates a unique correlation ID for request tracing.
fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}
