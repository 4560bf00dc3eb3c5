//! Campus room finder: room schedules laid out as a week grid, and a
//! free-room search fanned out over every building.

pub mod config;
pub mod room;
pub mod schedule;
pub mod search;
pub mod server;
pub mod types;
pub mod upstream;

pub use schedule::{layout_week, sanitize_and_format};
