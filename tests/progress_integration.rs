use proptest::prelude::*;
use shelf_core::ShelfError;
use shelf_core::domain::{BookId, ShelfEntry, ShelfStatus};
use shelf_core::progress::{parse_page, set_progress};

fn reading(page_count: Option<u32>) -> ShelfEntry {
    ShelfEntry::new(BookId(7), ShelfStatus::CurrentlyReading, page_count)
}

#[test]
fn page_within_count_is_returned_unchanged() {
    let progress = set_progress(&reading(Some(300)), 150).unwrap();
    assert_eq!(progress.page, 150);
    assert_eq!(progress.percent, 50);
}

#[test]
fn last_page_is_one_hundred_percent() {
    let progress = set_progress(&reading(Some(287)), 287).unwrap();
    assert_eq!(progress.percent, 100);
}

#[test]
fn negative_page_is_invalid_progress() {
    let err = set_progress(&reading(Some(300)), -1).unwrap_err();
    assert!(matches!(err, ShelfError::InvalidProgress(_)));
}

#[test]
fn page_past_the_end_is_rejected() {
    let err = set_progress(&reading(Some(300)), 301).unwrap_err();
    match err {
        ShelfError::ProgressExceedsPageCount {
            requested,
            page_count,
        } => {
            assert_eq!(requested, 301);
            assert_eq!(page_count, 300);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_page_count_accepts_any_page_at_zero_percent() {
    let progress = set_progress(&reading(None), 12_345).unwrap();
    assert_eq!(progress.page, 12_345);
    assert_eq!(progress.percent, 0);
}

#[test]
fn oversized_page_is_invalid_progress() {
    let err = set_progress(&reading(None), i64::from(u32::MAX) + 1).unwrap_err();
    assert!(matches!(err, ShelfError::InvalidProgress(_)));
}

#[test]
fn textual_page_must_be_a_whole_number() {
    assert!(matches!(parse_page("3.5"), Err(ShelfError::InvalidProgress(_))));
    assert!(matches!(parse_page("abc"), Err(ShelfError::InvalidProgress(_))));
    assert!(matches!(parse_page("-2"), Err(ShelfError::InvalidProgress(_))));
    assert_eq!(parse_page("42").unwrap(), 42);
}

proptest! {
    #[test]
    fn prop_page_in_range_is_unchanged(count in 1u32..5_000, seed in any::<u32>()) {
        let page = seed % (count + 1);
        let progress = set_progress(&reading(Some(count)), i64::from(page)).unwrap();

        prop_assert_eq!(progress.page, page);
        let expected = (f64::from(page) * 100.0 / f64::from(count)).round() as u32;
        prop_assert_eq!(progress.percent, expected);
    }

    #[test]
    fn prop_page_past_count_is_rejected(count in 0u32..5_000, extra in 1u32..1_000) {
        let result = set_progress(&reading(Some(count)), i64::from(count) + i64::from(extra));
        let is_exceeds = matches!(result, Err(ShelfError::ProgressExceedsPageCount { .. }));
        prop_assert!(is_exceeds);
    }
}
