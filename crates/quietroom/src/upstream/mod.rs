//! Client side of the QuietRoom room and availability API.
mod client;
mod error;
mod types;

pub use client::{BuildingOutcome, QuietRoomClient, QuietRoomConfig, QUIETROOM_BASE_URL};
pub use error::QuietRoomError;
pub use types::{AvailabilityQuery, RoomInfo};
