use chrono::NaiveDate;

use crate::domain::{BookId, ShelfEntry, ShelfStatus};
use crate::error::ShelfResult;
use crate::progress;

/// Applies a status change to a (possibly absent) shelf entry.
///
/// Every pair of states is connected; what matters are the side effects:
///
/// - entering [`ShelfStatus::Read`] jumps to the last page (when the page
///   count is known) and stamps `finished_date` with `today`
/// - leaving `Read` rewinds to page zero and clears `finished_date`
/// - anything else keeps the current page
///
/// A `target` of `None` removes the entry and the result is `None`.
/// `explicit_page`, when given, wins over the automatic page and is
/// validated against the page count. Re-applying the current status is a
/// no-op apart from the explicit page.
///
/// `page_count` is the catalog's latest value and replaces the one stored
/// on the entry.
pub fn transition(
    current: Option<&ShelfEntry>,
    book_id: BookId,
    page_count: Option<u32>,
    target: Option<ShelfStatus>,
    explicit_page: Option<i64>,
    today: NaiveDate,
) -> ShelfResult<Option<ShelfEntry>> {
    let Some(target) = target else {
        return Ok(None);
    };

    // validate before touching anything
    let explicit = explicit_page
        .map(|page| progress::check_page(page_count, page))
        .transpose()?;

    let mut next = match current {
        Some(entry) => entry.clone(),
        None => ShelfEntry::new(book_id, target, page_count),
    };
    next.page_count = page_count;

    let previous = current.map(|entry| entry.status);
    if previous != Some(target) {
        if previous == Some(ShelfStatus::Read) {
            next.current_page = 0;
            next.finished_date = None;
        }

        if target == ShelfStatus::Read {
            if let Some(count) = page_count {
                next.current_page = count;
            }
            next.finished_date = Some(today);
        }

        next.status = target;
    }

    if let Some(progress) = explicit {
        next.current_page = progress.page;
    }

    // a page count that shrank in the catalog must not leave us past the end
    if let Some(count) = page_count {
        next.current_page = next.current_page.min(count);
    }

    Ok(Some(next))
}

/// Whether moving from `from` to `to` changes the status at all.
pub fn changes_status(from: Option<ShelfStatus>, to: Option<ShelfStatus>) -> bool {
    from != to
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_shelving_starts_at_page_zero() {
        let entry = transition(
            None,
            BookId(1),
            Some(200),
            Some(ShelfStatus::CurrentlyReading),
            None,
            day(2024, 1, 1),
        )
        .unwrap()
        .unwrap();

        assert_eq!(entry.current_page, 0);
        assert_eq!(entry.finished_date, None);
    }

    #[test]
    fn read_without_page_count_keeps_page() {
        let mut reading = ShelfEntry::new(BookId(2), ShelfStatus::CurrentlyReading, None);
        reading.current_page = 57;

        let read = transition(
            Some(&reading),
            BookId(2),
            None,
            Some(ShelfStatus::Read),
            None,
            day(2024, 5, 2),
        )
        .unwrap()
        .unwrap();

        assert_eq!(read.current_page, 57);
        assert_eq!(read.finished_date, Some(day(2024, 5, 2)));
    }

    #[test]
    fn shrunken_page_count_clamps_current_page() {
        let mut reading = ShelfEntry::new(BookId(3), ShelfStatus::CurrentlyReading, Some(400));
        reading.current_page = 350;

        let next = transition(
            Some(&reading),
            BookId(3),
            Some(300),
            Some(ShelfStatus::CurrentlyReading),
            None,
            day(2024, 5, 2),
        )
        .unwrap()
        .unwrap();

        assert_eq!(next.current_page, 300);
        assert_eq!(next.page_count, Some(300));
    }

    #[test]
    fn status_change_detection() {
        assert!(changes_status(None, Some(ShelfStatus::Read)));
        assert!(changes_status(Some(ShelfStatus::Read), None));
        assert!(!changes_status(Some(ShelfStatus::Dnf), Some(ShelfStatus::Dnf)));
    }
}
