//! Current-term filtering and formatting of raw room events.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use super::format::{date_parts, format_date, format_time};
use super::types::{DisplayEvent, RawEvent};

/// Parses the date part of a `YYYY-MM-DD...` string.
///
/// Non-numeric components and impossible calendar dates yield `None`.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let (year, month, day) = date_parts(raw)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// An end date is valid unless it is already in the past.
pub fn is_valid_end_date(raw: &str, today: NaiveDate) -> bool {
    parse_event_date(raw).is_some_and(|end| end >= today)
}

/// A start date is valid unless it is still in the future.
pub fn is_valid_start_date(raw: &str, today: NaiveDate) -> bool {
    parse_event_date(raw).is_some_and(|start| start <= today)
}

/// Whether `today` falls within the event's `[StartDate, EndDate]` window.
pub fn is_active(event: &RawEvent, today: NaiveDate) -> bool {
    is_valid_end_date(&event.end_date, today) && is_valid_start_date(&event.start_date, today)
}

/// Keeps only the events whose active window contains `today`.
///
/// Input order is preserved and duplicates are kept.
pub fn sanitize(raw_events: &[RawEvent], today: NaiveDate) -> Vec<RawEvent> {
    raw_events
        .iter()
        .filter(|e| is_active(e, today))
        .cloned()
        .collect()
}

/// Builds display rows for every event active on `today`.
///
/// Events with dates or times that cannot be read are dropped.
pub fn sanitize_and_format(raw_events: &[RawEvent], today: NaiveDate) -> Vec<DisplayEvent> {
    let active = sanitize(raw_events, today);
    let dropped_inactive = raw_events.len() - active.len();

    let rows: Vec<DisplayEvent> = active.iter().filter_map(to_display_event).collect();

    debug!(
        total = raw_events.len(),
        inactive = dropped_inactive,
        malformed = active.len() - rows.len(),
        kept = rows.len(),
        "Sanitized room events"
    );

    rows
}

fn to_display_event(event: &RawEvent) -> Option<DisplayEvent> {
    Some(DisplayEvent {
        event_id: Uuid::new_v4(),
        name: event.name.clone(),
        days_met: event.days_met.join(" - "),
        start_time: format_time(&event.start_time)?,
        end_time: format_time(&event.end_time)?,
        raw_start_time: event.start_time.clone(),
        raw_end_time: event.end_time.clone(),
        start_date: format_date(&event.start_date)?,
        end_date: format_date(&event.end_date)?,
        days: event.weekdays(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, start_date: &str, end_date: &str) -> RawEvent {
        RawEvent {
            name: name.to_string(),
            days_met: vec!["M".to_string(), "W".to_string()],
            start_time: "0900".to_string(),
            end_time: "1000".to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_active_window_boundaries() {
        let today = date(2024, 2, 1);

        assert!(is_active(&event("a", "2024-02-01", "2024-05-01"), today));
        assert!(is_active(&event("b", "2024-01-01", "2024-02-01"), today));
        assert!(is_active(&event("c", "2024-02-01", "2024-02-01"), today));
        assert!(!is_active(&event("d", "2024-02-02", "2024-05-01"), today));
        assert!(!is_active(&event("e", "2023-08-20", "2024-01-31"), today));
    }

    #[test]
    fn test_sanitize_preserves_order_and_duplicates() {
        let today = date(2024, 2, 1);
        let events = vec![
            event("future", "2024-03-01", "2024-05-01"),
            event("x", "2024-01-01", "2024-05-01"),
            event("past", "2023-01-01", "2023-05-01"),
            event("x", "2024-01-01", "2024-05-01"),
            event("y", "2024-01-15", "2024-02-15"),
        ];

        let kept = sanitize(&events, today);
        let names: Vec<_> = kept.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["x", "x", "y"]);
    }

    #[test]
    fn test_sanitize_fails_closed_on_malformed_dates() {
        let today = date(2024, 2, 1);
        let events = vec![
            event("bad-month", "2024-XX-01", "2024-05-01"),
            event("bad-end", "2024-01-01", "TBA"),
            event("impossible", "2024-01-01", "2024-02-30"),
            event("empty", "", ""),
        ];

        assert!(sanitize(&events, today).is_empty());
    }

    #[test]
    fn test_sanitize_and_format_end_to_end() {
        let today = date(2024, 2, 1);
        let raw = RawEvent {
            name: "CS101".to_string(),
            days_met: vec!["M".to_string(), "W".to_string()],
            start_time: "0900".to_string(),
            end_time: "1000".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-05-01".to_string(),
        };

        let display = sanitize_and_format(&[raw], today);
        assert_eq!(display.len(), 1);

        let row = &display[0];
        assert_eq!(row.name, "CS101");
        assert_eq!(row.days_met, "M - W");
        assert_eq!(row.start_time, "9:00 AM");
        assert_eq!(row.end_time, "10:00 AM");
        assert_eq!(row.raw_start_time, "0900");
        assert_eq!(row.raw_end_time, "1000");
        assert_eq!(row.start_date, "1/1/2024");
        assert_eq!(row.end_date, "5/1/2024");
    }

    #[test]
    fn test_identical_events_get_distinct_ids() {
        let today = date(2024, 2, 1);
        let e = event("dup", "2024-01-01", "2024-05-01");

        let display = sanitize_and_format(&[e.clone(), e], today);
        assert_eq!(display.len(), 2);
        assert_ne!(display[0].event_id, display[1].event_id);
    }

    #[test]
    fn test_malformed_time_is_dropped() {
        let today = date(2024, 2, 1);
        let mut e = event("tba", "2024-01-01", "2024-05-01");
        e.start_time = "TBA".to_string();

        assert!(sanitize_and_format(&[e], today).is_empty());
    }
}
