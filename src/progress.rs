//! Page progress validation.
//!
//! Every page value that reaches a [`ShelfEntry`] passes through
//! [`set_progress`] first, which keeps `current_page` inside the book's known
//! page count.

use serde::{Deserialize, Serialize};

use crate::domain::ShelfEntry;
use crate::error::{ShelfError, ShelfResult};

/// A validated page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub page: u32,
    pub percent: u32,
}

/// Validates `requested_page` against the entry's page count.
///
/// The page is returned unchanged; nothing is clamped silently. `percent` is
/// `0` when the page count is unknown (or zero).
///
/// # Errors
/// - [`ShelfError::InvalidProgress`] for negative pages or pages that do not
///   fit a page counter
/// - [`ShelfError::ProgressExceedsPageCount`] when the page is past the end
pub fn set_progress(entry: &ShelfEntry, requested_page: i64) -> ShelfResult<Progress> {
    check_page(entry.page_count, requested_page)
}

/// Same as [`set_progress`], for callers that have not created an entry yet.
pub fn check_page(page_count: Option<u32>, requested_page: i64) -> ShelfResult<Progress> {
    if requested_page < 0 {
        return Err(ShelfError::InvalidProgress(format!(
            "page must be a non-negative integer, got {requested_page}"
        )));
    }

    let page = u32::try_from(requested_page).map_err(|_| {
        ShelfError::InvalidProgress(format!("page {requested_page} is out of range"))
    })?;

    if let Some(count) = page_count {
        if page > count {
            return Err(ShelfError::ProgressExceedsPageCount {
                requested: page,
                page_count: count,
            });
        }
    }

    Ok(Progress {
        page,
        percent: percent_of(page, page_count),
    })
}

/// Parses a raw page value as sent by a client.
///
/// Accepts surrounding whitespace; rejects fractions, signs other than a
/// leading minus (which is then rejected as negative) and empty input.
pub fn parse_page(raw: &str) -> ShelfResult<i64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| ShelfError::InvalidProgress(format!("'{trimmed}' is not a whole page number")))
        .and_then(|page| {
            if page < 0 {
                Err(ShelfError::InvalidProgress(format!(
                    "page must be a non-negative integer, got {page}"
                )))
            } else {
                Ok(page)
            }
        })
}

/// `round(page / page_count * 100)` with halves rounded up.
pub fn percent_of(page: u32, page_count: Option<u32>) -> u32 {
    match page_count {
        Some(count) if count > 0 => {
            let page = u64::from(page);
            let count = u64::from(count);
            ((page * 200 + count) / (count * 2)) as u32
        }
        _ => 0,
    }
}
