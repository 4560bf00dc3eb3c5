/// Room schedule processing: current-term filter, display formatting and week layout
mod format;
mod layout;
mod sanitize;
mod types;

pub use format::{format_date, format_time, minutes_to_raw, parse_minutes};
pub use layout::{layout_week, DayColumn, HourTick, LayoutOptions, Placement, TimeAxis, WeekLayout};
pub use sanitize::{
    is_active, is_valid_end_date, is_valid_start_date, parse_event_date, sanitize,
    sanitize_and_format,
};
pub use types::{DisplayEvent, RawEvent, Weekday};
