use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Length of every goal year. Leap days are deliberately not modelled, so
/// Dec 31 of a leap year already counts as the full year.
pub const DAYS_IN_YEAR: u32 = 365;

/// Raw inputs of the pace calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceInput {
    /// Books the reader aims for; `0` means no goal is set.
    pub goal: u32,
    pub books_read: u32,
    /// Days of the goal year already started, `1` on Jan 1.
    pub days_elapsed: u32,
}

impl PaceInput {
    /// Builds the input for `year` as seen on `today`.
    pub fn for_date(goal: u32, books_read: u32, year: i32, today: NaiveDate) -> Self {
        PaceInput {
            goal,
            books_read,
            days_elapsed: days_elapsed(year, today),
        }
    }
}

/// Goal card figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPace {
    pub goal: u32,
    pub books_read: u32,
    pub progress_percent: u32,
    pub days_elapsed: u32,
    pub days_remaining: u32,
    pub expected_books: u32,
    pub ahead_of_pace: bool,
    pub pace_delta: u32,
    pub books_remaining: u32,
    /// Books per day still needed, two decimals.
    pub required_pace_per_day: f64,
    pub goal_reached: bool,
}

impl GoalPace {
    pub fn compute(input: PaceInput) -> Self {
        let PaceInput {
            goal,
            books_read,
            days_elapsed,
        } = input;
        let days_elapsed = days_elapsed.min(DAYS_IN_YEAR);
        let days_remaining = DAYS_IN_YEAR - days_elapsed;

        let progress_percent = if goal > 0 {
            round_ratio(u64::from(books_read) * 100, u64::from(goal))
        } else {
            0
        };

        let expected_books = if goal > 0 {
            round_ratio(
                u64::from(days_elapsed) * u64::from(goal),
                u64::from(DAYS_IN_YEAR),
            )
        } else {
            0
        };

        let books_remaining = goal.saturating_sub(books_read);
        let required_pace_per_day = if books_remaining > 0 && days_remaining > 0 {
            let pace = f64::from(books_remaining) / f64::from(days_remaining);
            (pace * 100.0).round() / 100.0
        } else {
            0.0
        };

        GoalPace {
            goal,
            books_read,
            progress_percent,
            days_elapsed,
            days_remaining,
            expected_books,
            ahead_of_pace: books_read >= expected_books,
            pace_delta: books_read.abs_diff(expected_books),
            books_remaining,
            required_pace_per_day,
            goal_reached: goal > 0 && books_read >= goal,
        }
    }

    pub fn for_date(goal: u32, books_read: u32, year: i32, today: NaiveDate) -> Self {
        Self::compute(PaceInput::for_date(goal, books_read, year, today))
    }
}

/// Days from Jan 1 of `year` through `today`, both included, clamped to
/// `[0, DAYS_IN_YEAR]`.
pub fn days_elapsed(year: i32, today: NaiveDate) -> u32 {
    if today.year() < year {
        return 0;
    }
    if today.year() > year {
        return DAYS_IN_YEAR;
    }
    today.ordinal().min(DAYS_IN_YEAR)
}

/// `round(numerator / denominator)` with halves rounded up.
fn round_ratio(numerator: u64, denominator: u64) -> u32 {
    let rounded = (numerator * 2 + denominator) / (denominator * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
