//! Week-view layout of a room's schedule.
//!
//! Every event is expanded into one placement per weekday it meets on.
//! Placements that overlap within a day column are spread over side-by-side
//! lanes using the greedy interval-partitioning strategy: sort by start time
//! and put each placement into the leftmost lane that is already free. When a
//! new lane has to be opened every existing lane is busy at that instant, so
//! the lane count equals the largest number of placements that overlap at
//! once, which is the least any layout can use.

use serde::Serialize;

use super::format::{format_time, minutes_to_raw, parse_minutes};
use super::types::{DisplayEvent, Weekday};

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Knobs for turning minutes and lanes into grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Width of a full day column
    pub column_width: f64,
    /// Vertical size of one minute
    pub minute_height: f64,
    /// Axis start (minutes since midnight) used when there is nothing to place
    pub default_start: i32,
    /// Axis end (minutes since midnight) used when there is nothing to place
    pub default_end: i32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            column_width: 100.0,
            minute_height: 1.0,
            default_start: 8 * 60,
            default_end: 22 * 60,
        }
    }
}

/// The vertical time range of the grid, in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeAxis {
    pub start: i32,
    pub end: i32,
}

impl TimeAxis {
    /// Pulls a minute value onto the axis.
    pub fn clamp(&self, minutes: i32) -> i32 {
        minutes.clamp(self.start, self.end)
    }

    pub fn span(&self) -> i32 {
        self.end - self.start
    }

    /// Labels for each whole hour on the axis, for the grid's ruler.
    pub fn hour_ticks(&self, minute_height: f64) -> Vec<HourTick> {
        let first = (self.start + 59) / 60 * 60;
        (first..=self.end)
            .step_by(60)
            .filter(|m| *m < MINUTES_PER_DAY)
            .filter_map(|m| {
                Some(HourTick {
                    offset: f64::from(m - self.start) * minute_height,
                    label: format_time(&minutes_to_raw(m))?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourTick {
    pub offset: f64,
    pub label: String,
}

/// One event drawn in one day column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement<'a> {
    pub event: &'a DisplayEvent,
    pub day: Weekday,
    pub lane: usize,
    pub lane_count: usize,
    pub start_offset: f64,
    pub height: f64,
    pub left: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayColumn<'a> {
    pub day: Weekday,
    /// Largest number of placements that overlap at once in this column
    pub lane_count: usize,
    /// Placements ordered by start time, then end time, then input order
    pub placements: Vec<Placement<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekLayout<'a> {
    pub axis: TimeAxis,
    pub ticks: Vec<HourTick>,
    /// Monday through Friday
    pub columns: [DayColumn<'a>; 5],
}

impl<'a> WeekLayout<'a> {
    pub fn column(&self, day: Weekday) -> &DayColumn<'a> {
        &self.columns[day.column()]
    }

    pub fn placement_count(&self) -> usize {
        self.columns.iter().map(|c| c.placements.len()).sum()
    }
}

/// `[start, end)` in minutes since midnight, already clamped to the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Span {
    start: i32,
    end: i32,
}

impl Span {
    fn of(event: &DisplayEvent) -> Option<Self> {
        let start = parse_minutes(&event.raw_start_time)?.clamp(0, MINUTES_PER_DAY);
        let end = parse_minutes(&event.raw_end_time)?.clamp(0, MINUTES_PER_DAY);
        Some(Span {
            start,
            end: end.max(start),
        })
    }

    /// Whether `next` can follow `self` in the same lane.
    ///
    /// Touching spans share a lane; a zero-length span is still open at
    /// its own instant.
    fn frees_before(&self, next: &Span) -> bool {
        self.end < next.start || (self.end == next.start && self.start < self.end)
    }
}

/// Lays out a room's events as a Monday to Friday week grid.
///
/// Pure and deterministic: the same event list always produces the same
/// lanes and coordinates.
pub fn layout_week<'a>(events: &'a [DisplayEvent], options: &LayoutOptions) -> WeekLayout<'a> {
    let spans: Vec<Option<Span>> = events.iter().map(Span::of).collect();
    let axis = time_axis(events, &spans, options);

    let mut buckets: [Vec<(usize, Span)>; 5] = Default::default();
    for (index, (event, span)) in events.iter().zip(&spans).enumerate() {
        let Some(span) = span else { continue };
        for day in &event.days {
            buckets[day.column()].push((index, *span));
        }
    }

    let columns = Weekday::ALL.map(|day| {
        let bucket = std::mem::take(&mut buckets[day.column()]);
        layout_column(day, bucket, events, &axis, options)
    });

    WeekLayout {
        axis,
        ticks: axis.hour_ticks(options.minute_height),
        columns,
    }
}

fn time_axis(events: &[DisplayEvent], spans: &[Option<Span>], options: &LayoutOptions) -> TimeAxis {
    let placeable = events
        .iter()
        .zip(spans)
        .filter(|(event, _)| !event.days.is_empty())
        .filter_map(|(_, span)| *span);

    let bounds = placeable.fold(None, |acc: Option<(i32, i32)>, span| match acc {
        Some((lo, hi)) => Some((lo.min(span.start), hi.max(span.end))),
        None => Some((span.start, span.end)),
    });

    match bounds {
        Some((start, end)) => TimeAxis { start, end },
        None => {
            let start = options.default_start.clamp(0, MINUTES_PER_DAY);
            let end = options.default_end.clamp(start, MINUTES_PER_DAY);
            TimeAxis { start, end }
        }
    }
}

fn layout_column<'a>(
    day: Weekday,
    mut bucket: Vec<(usize, Span)>,
    events: &'a [DisplayEvent],
    axis: &TimeAxis,
    options: &LayoutOptions,
) -> DayColumn<'a> {
    bucket.sort_by_key(|(index, span)| (span.start, span.end, *index));

    // Last placement in each lane
    let mut lane_tails: Vec<Span> = Vec::new();
    let mut lanes = Vec::with_capacity(bucket.len());
    for (_, span) in &bucket {
        let lane = match lane_tails.iter().position(|tail| tail.frees_before(span)) {
            Some(free) => {
                lane_tails[free] = *span;
                free
            }
            None => {
                lane_tails.push(*span);
                lane_tails.len() - 1
            }
        };
        lanes.push(lane);
    }

    let lane_count = lane_tails.len();
    let width = if lane_count == 0 {
        options.column_width
    } else {
        options.column_width / lane_count as f64
    };

    let placements = bucket
        .into_iter()
        .zip(lanes)
        .map(|((index, span), lane)| {
            let top = axis.clamp(span.start);
            let bottom = axis.clamp(span.end);
            Placement {
                event: &events[index],
                day,
                lane,
                lane_count,
                start_offset: f64::from(top - axis.start) * options.minute_height,
                height: f64::from(bottom - top) * options.minute_height,
                left: lane as f64 * width,
                width,
            }
        })
        .collect();

    DayColumn {
        day,
        lane_count,
        placements,
    }
}
