//! Room card: title, capacity, display room type and icon.

use serde::{Deserialize, Serialize};

use crate::upstream::RoomInfo;

/// Icon shown on a room card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomIcon {
    Classroom,
    Computer,
    Lab,
    Auditorium,
    Info,
}

impl RoomIcon {
    /// Classifies a raw room type. The first matching rule wins:
    /// classroom, then computer/graphics, then lab, then auditorium.
    pub fn classify(room_type: &str) -> Self {
        if room_type.contains("Classroom") {
            RoomIcon::Classroom
        } else if room_type.contains("Computer") || room_type.contains("Graphics") {
            RoomIcon::Computer
        } else if room_type.contains("Lab") {
            RoomIcon::Lab
        } else if room_type.contains("Auditorium") {
            RoomIcon::Auditorium
        } else {
            RoomIcon::Info
        }
    }

    /// Static asset the page shell renders for this icon.
    pub fn asset(self) -> &'static str {
        match self {
            RoomIcon::Classroom => "book-solid.svg",
            RoomIcon::Computer => "desktop-solid.svg",
            RoomIcon::Lab => "flask-solid.svg",
            RoomIcon::Auditorium => "auditorium.png",
            RoomIcon::Info => "info.png",
        }
    }
}

/// Human-readable room type.
///
/// A leading `*` marker is dropped first. What remains is shown as-is,
/// except that a lab type with a qualifier (`Lab Computer`, `Lab/Teaching`)
/// becomes `Lab - <qualifier>`.
pub fn room_type_label(room_type: &str) -> String {
    let unmarked = room_type.trim().strip_prefix('*').unwrap_or(room_type.trim());

    match unmarked.strip_prefix("Lab") {
        Some(rest) => {
            let qualifier = rest
                .trim_start_matches(|c: char| c.is_whitespace() || c == '/' || c == '-')
                .trim_end();
            if qualifier.is_empty() || qualifier.len() == rest.len() {
                unmarked.to_string()
            } else {
                format!("Lab - {qualifier}")
            }
        }
        None => unmarked.to_string(),
    }
}

/// Summary card for a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomCard {
    /// e.g. `"OKT N155"`
    pub title: String,
    pub capacity: Option<u32>,
    pub room_type: String,
    pub icon: RoomIcon,
    pub icon_asset: &'static str,
}

impl RoomCard {
    pub fn from_info(info: &RoomInfo) -> Self {
        let icon = RoomIcon::classify(&info.room_type);
        Self {
            title: format!("{} {}", info.building_code, info.room_number),
            capacity: info.capacity,
            room_type: room_type_label(&info.room_type),
            icon,
            icon_asset: icon.asset(),
        }
    }
}
