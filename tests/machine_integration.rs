use chrono::NaiveDate;
use shelf_core::ShelfError;
use shelf_core::domain::{BookId, ShelfEntry, ShelfStatus};
use shelf_core::shelf::machine::transition;

const BOOK: BookId = BookId(300);

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn to(
    current: Option<&ShelfEntry>,
    page_count: Option<u32>,
    target: Option<ShelfStatus>,
    page: Option<i64>,
) -> Option<ShelfEntry> {
    transition(current, BOOK, page_count, target, page, day(2024, 6, 1)).unwrap()
}

#[test]
fn read_then_dnf_resets_progress() {
    let reading = to(None, Some(300), Some(ShelfStatus::CurrentlyReading), Some(120)).unwrap();
    assert_eq!(reading.current_page, 120);

    let read = to(Some(&reading), Some(300), Some(ShelfStatus::Read), None).unwrap();
    assert_eq!(read.current_page, 300);
    assert_eq!(read.finished_date, Some(day(2024, 6, 1)));

    let dnf = to(Some(&read), Some(300), Some(ShelfStatus::Dnf), None).unwrap();
    assert_eq!(dnf.current_page, 0);
    assert_eq!(dnf.finished_date, None);
}

#[test]
fn every_status_is_reachable_from_every_other() {
    let statuses = [
        None,
        Some(ShelfStatus::WantToRead),
        Some(ShelfStatus::CurrentlyReading),
        Some(ShelfStatus::Read),
        Some(ShelfStatus::Dnf),
    ];

    for from in statuses {
        let current = to(None, Some(100), from, None);
        for target in statuses {
            let next = transition(current.as_ref(), BOOK, Some(100), target, None, day(2024, 6, 2));
            let next = next.unwrap_or_else(|e| panic!("{from:?} -> {target:?} failed: {e}"));
            assert_eq!(next.map(|e| e.status), target);
        }
    }
}

#[test]
fn same_status_is_a_no_op() {
    let read = to(None, Some(250), Some(ShelfStatus::Read), None).unwrap();

    let again = transition(Some(&read), BOOK, Some(250), Some(ShelfStatus::Read), None, day(2024, 9, 9))
        .unwrap()
        .unwrap();

    assert_eq!(again, read);
    assert_eq!(again.finished_date, Some(day(2024, 6, 1)));
}

#[test]
fn same_status_still_applies_explicit_page() {
    let reading = to(None, Some(250), Some(ShelfStatus::CurrentlyReading), None).unwrap();
    let moved = to(Some(&reading), Some(250), Some(ShelfStatus::CurrentlyReading), Some(80)).unwrap();

    assert_eq!(moved.status, ShelfStatus::CurrentlyReading);
    assert_eq!(moved.current_page, 80);
}

#[test]
fn explicit_page_overrides_read_page_forcing() {
    let read = to(None, Some(400), Some(ShelfStatus::Read), Some(390)).unwrap();
    assert_eq!(read.current_page, 390);
    assert!(read.finished_date.is_some());
}

#[test]
fn explicit_page_is_validated_before_anything_changes() {
    let reading = to(None, Some(200), Some(ShelfStatus::CurrentlyReading), Some(10)).unwrap();

    let err = transition(
        Some(&reading),
        BOOK,
        Some(200),
        Some(ShelfStatus::Read),
        Some(201),
        day(2024, 6, 1),
    )
    .unwrap_err();
    assert!(matches!(err, ShelfError::ProgressExceedsPageCount { .. }));

    let err = transition(
        Some(&reading),
        BOOK,
        Some(200),
        Some(ShelfStatus::Dnf),
        Some(-5),
        day(2024, 6, 1),
    )
    .unwrap_err();
    assert!(matches!(err, ShelfError::InvalidProgress(_)));
}

#[test]
fn leaving_read_for_the_shelf_void_removes_the_entry() {
    let read = to(None, Some(120), Some(ShelfStatus::Read), None).unwrap();
    assert_eq!(to(Some(&read), Some(120), None, None), None);
}

#[test]
fn non_read_moves_keep_the_page() {
    let reading = to(None, Some(500), Some(ShelfStatus::CurrentlyReading), Some(222)).unwrap();

    let dnf = to(Some(&reading), Some(500), Some(ShelfStatus::Dnf), None).unwrap();
    assert_eq!(dnf.current_page, 222);

    let want = to(Some(&dnf), Some(500), Some(ShelfStatus::WantToRead), None).unwrap();
    assert_eq!(want.current_page, 222);
}

#[test]
fn rereading_a_finished_book_restamps_the_finish_date() {
    let first = transition(None, BOOK, Some(90), Some(ShelfStatus::Read), None, day(2023, 2, 1))
        .unwrap()
        .unwrap();
    let again = transition(
        Some(&first),
        BOOK,
        Some(90),
        Some(ShelfStatus::CurrentlyReading),
        None,
        day(2024, 1, 3),
    )
    .unwrap()
    .unwrap();
    let finished = transition(Some(&again), BOOK, Some(90), Some(ShelfStatus::Read), None, day(2024, 1, 20))
        .unwrap()
        .unwrap();

    assert_eq!(again.current_page, 0);
    assert_eq!(finished.finished_date, Some(day(2024, 1, 20)));
    assert_eq!(finished.current_page, 90);
}
