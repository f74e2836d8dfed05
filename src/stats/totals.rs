use serde::{Deserialize, Serialize};

use crate::domain::{ShelfEntry, ShelfStatus};

/// Badge counts for the shelf tabs. Not time scoped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfCounts {
    pub want_to_read: u32,
    pub currently_reading: u32,
    pub read: u32,
    pub dnf: u32,
}

impl ShelfCounts {
    pub fn tally<'a>(entries: impl IntoIterator<Item = &'a ShelfEntry>) -> Self {
        let mut counts = ShelfCounts::default();
        for entry in entries {
            *counts.slot(entry.status) += 1;
        }
        counts
    }

    pub fn get(&self, status: ShelfStatus) -> u32 {
        match status {
            ShelfStatus::WantToRead => self.want_to_read,
            ShelfStatus::CurrentlyReading => self.currently_reading,
            ShelfStatus::Read => self.read,
            ShelfStatus::Dnf => self.dnf,
        }
    }

    pub fn total(&self) -> u32 {
        self.want_to_read + self.currently_reading + self.read + self.dnf
    }

    fn slot(&mut self, status: ShelfStatus) -> &mut u32 {
        match status {
            ShelfStatus::WantToRead => &mut self.want_to_read,
            ShelfStatus::CurrentlyReading => &mut self.currently_reading,
            ShelfStatus::Read => &mut self.read,
            ShelfStatus::Dnf => &mut self.dnf,
        }
    }
}

/// Yearly reading totals plus the live currently-reading count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfStats {
    pub books_read_this_year: u32,
    pub pages_read_this_year: u64,
    pub currently_reading: u32,
}

impl ShelfStats {
    /// Only `Read` entries finished in `year` contribute pages. A finished
    /// book without a known page count contributes the page it was left on.
    pub fn compute<'a>(entries: impl IntoIterator<Item = &'a ShelfEntry>, year: i32) -> Self {
        let mut stats = ShelfStats::default();

        for entry in entries {
            if entry.status == ShelfStatus::CurrentlyReading {
                stats.currently_reading += 1;
            }
            if entry.finished_in(year) {
                stats.books_read_this_year += 1;
                stats.pages_read_this_year +=
                    u64::from(entry.page_count.unwrap_or(entry.current_page));
            }
        }

        stats
    }
}

/// Number of entries that count towards the goal for `year`.
pub fn books_read_in<'a>(entries: impl IntoIterator<Item = &'a ShelfEntry>, year: i32) -> u32 {
    entries
        .into_iter()
        .filter(|entry| entry.finished_in(year))
        .count() as u32
}
