use axum::http::HeaderMap;
use regex::Regex;
use std::sync::LazyLock;

use crate::schedule::Weekday;
use crate::search::SessionKey;
use crate::upstream::{AvailabilityQuery, QuietRoomError};

/// Header carrying the browser's session token.
pub const SESSION_HEADER: &str = "x-session-id";

pub const DEFAULT_DAY: &str = "M";
pub const DEFAULT_START_TIME: &str = "1000";
pub const DEFAULT_END_TIME: &str = "1200";

// `HH:MM` from a time input, or `HHMM` as the API takes it
static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):?([0-5][0-9])$").unwrap());

/// Session key for the request, from [`SESSION_HEADER`].
///
/// `None` when the header is missing or blank; such requests have no
/// session to store a search in.
pub fn session_key(headers: &HeaderMap) -> Option<SessionKey> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(SessionKey::from_token)
}

/// Converts `HH:MM` or `HHMM` into `HHMM`.
pub fn normalize_time(raw: &str) -> Option<String> {
    let caps = TIME_REGEX.captures(raw.trim())?;
    Some(format!("{}{}", &caps[1], &caps[2]))
}

/// Accepts a single weekday code, case-insensitively.
pub fn normalize_day(raw: &str) -> Option<String> {
    let code = raw.trim().to_uppercase();
    Weekday::from_code(&code).map(|day| day.code().to_string())
}

/// Trims the building code and upper-cases the room number.
pub fn normalize_room(building: &str, room: &str) -> Result<(String, String), QuietRoomError> {
    let building = building.trim();
    let room = room.trim().to_uppercase();

    if building.is_empty() || room.is_empty() {
        return Err(QuietRoomError::InvalidInput {
            message: "building and room number are required".to_string(),
        });
    }

    Ok((building.to_string(), room))
}

/// Builds an availability query from optional form fields, filling in defaults.
pub fn availability_query(
    day: Option<&str>,
    start_time: Option<&str>,
    end_time: Option<&str>,
) -> Result<AvailabilityQuery, QuietRoomError> {
    let invalid = |message: String| QuietRoomError::InvalidInput { message };

    let day_raw = day.unwrap_or(DEFAULT_DAY);
    let day = normalize_day(day_raw).ok_or_else(|| invalid(format!("invalid day: {day_raw}")))?;

    let start_raw = start_time.unwrap_or(DEFAULT_START_TIME);
    let start_time = normalize_time(start_raw)
        .ok_or_else(|| invalid(format!("invalid start time: {start_raw}")))?;

    let end_raw = end_time.unwrap_or(DEFAULT_END_TIME);
    let end_time =
        normalize_time(end_raw).ok_or_else(|| invalid(format!("invalid end time: {end_raw}")))?;

    // Same width, so string order is time order
    if start_time >= end_time {
        return Err(invalid(format!(
            "start time {start_time} must be before end time {end_time}"
        )));
    }

    Ok(AvailabilityQuery {
        day,
        start_time,
        end_time,
    })
}
