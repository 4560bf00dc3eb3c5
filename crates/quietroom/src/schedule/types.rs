/// Types for room schedule data
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A weekday column of the schedule grid.
///
/// Codes follow the registrar convention: `R` is Thursday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// All grid columns, left to right.
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Parses a single-letter day code. Weekend and unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "M" => Some(Weekday::Monday),
            "T" => Some(Weekday::Tuesday),
            "W" => Some(Weekday::Wednesday),
            "R" => Some(Weekday::Thursday),
            "F" => Some(Weekday::Friday),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Weekday::Monday => "M",
            Weekday::Tuesday => "T",
            Weekday::Wednesday => "W",
            Weekday::Thursday => "R",
            Weekday::Friday => "F",
        }
    }

    /// Column index in the week grid (Monday is 0).
    pub fn column(self) -> usize {
        self as usize
    }
}

/// One scheduled meeting pattern of a class in a room, as the QuietRoom API sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "Name")]
    pub name: String,

    /// Day codes, e.g. `["M", "W", "F"]`
    #[serde(rename = "DaysMet", deserialize_with = "deserialize_days_met", default)]
    pub days_met: Vec<String>,

    /// 24-hour `HHMM`
    #[serde(rename = "StartTime")]
    pub start_time: String,

    /// 24-hour `HHMM`
    #[serde(rename = "EndTime")]
    pub end_time: String,

    /// `YYYY-MM-DD`
    #[serde(rename = "StartDate")]
    pub start_date: String,

    /// `YYYY-MM-DD`
    #[serde(rename = "EndDate")]
    pub end_date: String,
}

impl RawEvent {
    /// Parsed grid columns this event meets on, in wire order, without repeats.
    pub fn weekdays(&self) -> Vec<Weekday> {
        let mut days = Vec::with_capacity(self.days_met.len());
        for day in self.days_met.iter().filter_map(|c| Weekday::from_code(c)) {
            if !days.contains(&day) {
                days.push(day);
            }
        }
        days
    }
}

/// `DaysMet` arrives either as `"M,W"` or as `["M","W"]`.
fn deserialize_days_met<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DaysMet {
        Joined(String),
        List(Vec<String>),
    }

    let codes: Vec<String> = match DaysMet::deserialize(deserializer)? {
        DaysMet::Joined(s) => s.split(',').map(|c| c.trim().to_string()).collect(),
        DaysMet::List(v) => v.into_iter().map(|c| c.trim().to_string()).collect(),
    };

    Ok(codes.into_iter().filter(|c| !c.is_empty()).collect())
}

/// A display-ready schedule row derived from a [`RawEvent`].
///
/// Field names match the row keys the room page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEvent {
    /// Row key only; fresh for every constructed event
    #[serde(rename = "EventID")]
    pub event_id: Uuid,

    #[serde(rename = "Name")]
    pub name: String,

    /// e.g. `"M - W - F"`
    #[serde(rename = "DaysMet")]
    pub days_met: String,

    /// e.g. `"9:00 AM"`
    #[serde(rename = "StartTime")]
    pub start_time: String,

    #[serde(rename = "EndTime")]
    pub end_time: String,

    #[serde(rename = "RawStartTime")]
    pub raw_start_time: String,

    #[serde(rename = "RawEndTime")]
    pub raw_end_time: String,

    /// e.g. `"3/7/2024"`
    #[serde(rename = "StartDate")]
    pub start_date: String,

    #[serde(rename = "EndDate")]
    pub end_date: String,

    /// Grid columns the event occupies
    #[serde(rename = "Days")]
    pub days: Vec<Weekday>,
}
