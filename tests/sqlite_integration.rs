use chrono::NaiveDate;
use shelf_core::clock::FixedClock;
use shelf_core::config::StoreConfig;
use shelf_core::domain::{Book, BookId, Rating, ShelfEntry, ShelfStatus, UserId};
use shelf_core::shelf::{Catalog, ShelfManager, ShelfStore, SqliteStore};
use shelf_core::{ShelfError, ShelfResult};
use tempfile::TempDir;
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn reader() -> UserId {
    UserId::new(Uuid::new_v4().to_string())
}

fn dune() -> Book {
    Book {
        id: BookId(10),
        title: "Dune".to_string(),
        page_count: Some(412),
        cover_url: Some("https://covers.example/dune.jpg".to_string()),
        authors: vec!["Frank Herbert".to_string()],
        genres: vec!["science fiction".to_string(), "classic".to_string()],
    }
}

#[tokio::test]
async fn catalog_round_trips_books() -> ShelfResult<()> {
    let store = SqliteStore::open_in_memory().await?;
    store.insert_book(&dune()).await?;

    let found = store.book(BookId(10)).await?.unwrap();
    assert_eq!(found, dune());
    assert!(store.book(BookId(11)).await?.is_none());

    // replacing keeps a single record with the new facts
    let mut revised = dune();
    revised.page_count = Some(896);
    revised.authors = vec!["Frank Herbert".to_string(), "Brian Herbert".to_string()];
    store.insert_book(&revised).await?;
    assert_eq!(store.book(BookId(10)).await?.unwrap(), revised);

    Ok(())
}

#[tokio::test]
async fn conditional_writes_reject_stale_versions() -> ShelfResult<()> {
    let store = SqliteStore::open_in_memory().await?;
    let user = reader();

    let mut entry = ShelfEntry::new(BookId(10), ShelfStatus::CurrentlyReading, Some(412));
    assert_eq!(store.put_entry(&user, &entry, None).await?, 1);

    // a second insert loses
    let err = store.put_entry(&user, &entry, None).await.unwrap_err();
    assert!(matches!(err, ShelfError::StoreConflict(BookId(10))));

    entry.current_page = 100;
    assert_eq!(store.put_entry(&user, &entry, Some(1)).await?, 2);

    // a writer still holding version 1 loses
    entry.current_page = 5;
    let err = store.put_entry(&user, &entry, Some(1)).await.unwrap_err();
    assert!(matches!(err, ShelfError::StoreConflict(_)));

    let stored = store.entry(&user, BookId(10)).await?.unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.entry.current_page, 100);

    let err = store.delete_entry(&user, BookId(10), 1).await.unwrap_err();
    assert!(matches!(err, ShelfError::StoreConflict(_)));
    store.delete_entry(&user, BookId(10), 2).await?;
    assert!(store.entry(&user, BookId(10)).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn entries_keep_every_field() -> ShelfResult<()> {
    let store = SqliteStore::open_in_memory().await?;
    let user = reader();

    let entry = ShelfEntry {
        book_id: BookId(77),
        status: ShelfStatus::Read,
        current_page: 250,
        page_count: Some(250),
        finished_date: Some(day(2024, 3, 5)),
        rating: Some(Rating::new(4)?),
    };
    store.put_entry(&user, &entry, None).await?;

    assert_eq!(store.entry(&user, BookId(77)).await?.unwrap().entry, entry);
    assert_eq!(store.entries_with_status(&user, ShelfStatus::Read).await?, vec![entry]);
    assert!(store
        .entries_with_status(&user, ShelfStatus::Dnf)
        .await?
        .is_empty());

    Ok(())
}

#[tokio::test]
async fn entries_are_listed_in_shelving_order() -> ShelfResult<()> {
    let store = SqliteStore::open_in_memory().await?;
    let user = reader();

    for id in [30, 10, 20] {
        let entry = ShelfEntry::new(BookId(id), ShelfStatus::WantToRead, None);
        store.put_entry(&user, &entry, None).await?;
    }

    // updating the first one must not move it
    let mut first = store.entry(&user, BookId(30)).await?.unwrap();
    first.entry.status = ShelfStatus::CurrentlyReading;
    store.put_entry(&user, &first.entry, Some(first.version)).await?;

    let order: Vec<BookId> = store
        .entries(&user)
        .await?
        .into_iter()
        .map(|e| e.book_id)
        .collect();
    assert_eq!(order, vec![BookId(30), BookId(10), BookId(20)]);

    Ok(())
}

#[tokio::test]
async fn goals_upsert_per_year() -> ShelfResult<()> {
    let store = SqliteStore::open_in_memory().await?;
    let user = reader();

    assert_eq!(store.goal(&user, 2024).await?, None);
    store.put_goal(&user, 2024, 20).await?;
    store.put_goal(&user, 2024, 25).await?;
    store.put_goal(&user, 2025, 30).await?;

    assert_eq!(store.goal(&user, 2024).await?, Some(25));
    assert_eq!(store.goal(&user, 2025).await?, Some(30));

    Ok(())
}

#[tokio::test]
async fn manager_over_an_on_disk_database() -> ShelfResult<()> {
    let tmpdir = TempDir::new()?;
    let config = StoreConfig::at(tmpdir.path().join("nested").join("shelf.db"));
    let user = reader();

    {
        let store = SqliteStore::open(&config).await?;
        store.insert_book(&dune()).await?;

        let shelves = ShelfManager::with_clock(store.clone(), store.clone(), FixedClock(day(2024, 3, 5)));
        shelves
            .update_status(&user, BookId(10), Some(ShelfStatus::Read), None)
            .await?;
        shelves.set_reading_goal(&user, 12).await?;
        store.close().await;
    }

    // reopen and read everything back
    let store = SqliteStore::open(&config).await?;
    let shelves = ShelfManager::with_clock(store.clone(), store, FixedClock(day(2024, 3, 20)));

    let read = shelves.shelf_books(&user, ShelfStatus::Read).await?;
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].entry.current_page, 412);
    assert_eq!(read[0].book.as_ref().unwrap().authors, vec!["Frank Herbert".to_string()]);

    let goal = shelves.reading_goal(&user).await?.unwrap();
    assert_eq!((goal.goal, goal.books_read), (12, 1));

    let calendar = shelves.reading_calendar(&user, 2024, 3).await?;
    assert_eq!(calendar.books_on(day(2024, 3, 5)).len(), 1);

    let stats = shelves.stats(&user).await?;
    assert_eq!(stats.pages_read_this_year, 412);

    Ok(())
}
