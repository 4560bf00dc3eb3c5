//! Display formatting for the raw time and date strings the QuietRoom API returns.

/// Converts a 24-hour `HHMM` string into a 12-hour `H:MM AM/PM` string.
///
/// The minute part is passed through as written; only the hour is
/// interpreted. Returns `None` if the string is too short or the hour is
/// not a number.
///
/// # Examples
/// ```
/// use quietroom::schedule::format_time;
///
/// assert_eq!(format_time("0000").as_deref(), Some("12:00 AM"));
/// assert_eq!(format_time("1305").as_deref(), Some("1:05 PM"));
/// ```
pub fn format_time(raw: &str) -> Option<String> {
    let mut hour: u32 = raw.get(0..2)?.parse().ok()?;
    let min = raw.get(2..4)?;

    let period = if hour >= 12 { "PM" } else { "AM" };
    if hour > 12 {
        hour -= 12;
    }
    if hour == 0 {
        hour = 12;
    }

    Some(format!("{hour}:{min} {period}"))
}

/// Converts a `YYYY-MM-DD...` string into an unpadded `M/D/YYYY` string.
///
/// # Examples
/// ```
/// use quietroom::schedule::format_date;
///
/// assert_eq!(format_date("2024-03-07").as_deref(), Some("3/7/2024"));
/// ```
pub fn format_date(raw: &str) -> Option<String> {
    let (year, month, day) = date_parts(raw)?;
    Some(format!("{month}/{day}/{year}"))
}

/// Splits a `YYYY-MM-DD...` string into its numeric components.
///
/// Anything past the tenth character (a time suffix, for example) is ignored.
pub(crate) fn date_parts(raw: &str) -> Option<(i32, u32, u32)> {
    let year = raw.get(0..4)?.parse().ok()?;
    let month = raw.get(5..7)?.parse().ok()?;
    let day = raw.get(8..10)?.parse().ok()?;
    Some((year, month, day))
}

/// Minutes since midnight for a 24-hour `HHMM` string.
///
/// Unlike [`format_time`] both parts must be numeric. Out-of-range values
/// are returned as-is; the layout engine clamps them.
pub fn parse_minutes(raw: &str) -> Option<i32> {
    let hour: i32 = raw.get(0..2)?.parse().ok()?;
    let min: i32 = raw.get(2..4)?.parse().ok()?;
    Some(hour * 60 + min)
}

/// Renders minutes since midnight back into the `HHMM` form.
pub fn minutes_to_raw(minutes: i32) -> String {
    let minutes = minutes.clamp(0, 24 * 60);
    format!("{:02}{:02}", minutes / 60, minutes % 60)
}
