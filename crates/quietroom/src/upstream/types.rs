/// Wire types for the QuietRoom API
use serde::{Deserialize, Deserializer, Serialize};

use crate::schedule::RawEvent;

/// Room details and its scheduled meetings.
///
/// `GET /building/{building}/room/{room}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    #[serde(rename = "BuildingCode")]
    pub building_code: String,

    #[serde(rename = "RoomNumber")]
    pub room_number: String,

    /// Seat count; some rooms report it as a string, some not at all
    #[serde(rename = "Capacity", default, deserialize_with = "deserialize_capacity")]
    pub capacity: Option<u32>,

    /// e.g. `"Classroom"`, `"*Lab Computer"`
    #[serde(rename = "RoomType", default)]
    pub room_type: String,

    #[serde(rename = "Events", default)]
    pub events: Vec<RawEvent>,
}

fn deserialize_capacity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Capacity {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<Capacity>::deserialize(deserializer)? {
        Some(Capacity::Number(n)) => Some(n),
        Some(Capacity::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Query for the free-room search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityQuery {
    /// Single weekday code (`M`, `T`, `W`, `R`, `F`)
    pub day: String,
    /// 24-hour `HHMM`
    pub start_time: String,
    /// 24-hour `HHMM`
    pub end_time: String,
}
