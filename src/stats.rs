//! Read-side aggregations over a reader's shelf.
//!
//! Everything here is a pure function of the entries handed in. Missing data
//! shows up as zeros or empty maps, never as an error.

pub mod calendar;
pub mod goal;
pub mod totals;

pub use calendar::{ReadingCalendar, build_calendar};
pub use goal::{DAYS_IN_YEAR, GoalPace, PaceInput};
pub use totals::{ShelfCounts, ShelfStats};
