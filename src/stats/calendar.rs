use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{ShelfEntry, ShelfStatus};

/// Books finished in one month, keyed by finish date.
///
/// Dates serialize as `YYYY-MM-DD`. Days without a finish have no key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingCalendar<T = ShelfEntry> {
    pub books_by_day: BTreeMap<NaiveDate, Vec<T>>,
    pub total_books: u32,
}

impl<T> ReadingCalendar<T> {
    pub fn empty() -> Self {
        ReadingCalendar {
            books_by_day: BTreeMap::new(),
            total_books: 0,
        }
    }

    /// Books finished on `date`; empty for days without finishes.
    pub fn books_on(&self, date: NaiveDate) -> &[T] {
        self.books_by_day.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<T> Default for ReadingCalendar<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Buckets `Read` entries finished in `year`/`month` by their finish date.
///
/// Within a day the input order is kept. A `month` outside `1..=12`
/// matches nothing.
pub fn build_calendar<T, I>(entries: I, year: i32, month: u32) -> ReadingCalendar<T>
where
    I: IntoIterator<Item = T>,
    T: AsRef<ShelfEntry>,
{
    let mut calendar = ReadingCalendar::empty();

    for item in entries {
        let entry = item.as_ref();
        if entry.status != ShelfStatus::Read {
            continue;
        }
        let Some(date) = entry.finished_date else {
            continue;
        };
        if date.year() != year || date.month() != month {
            continue;
        }

        calendar.books_by_day.entry(date).or_default().push(item);
        calendar.total_books += 1;
    }

    calendar
}
