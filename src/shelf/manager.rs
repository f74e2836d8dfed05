use chrono::Datelike;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::domain::{
    BookId, BookSummary, Rating, ReadingGoal, ShelfBook, ShelfEntry, ShelfStatus, UserId,
};
use crate::error::{ShelfError, ShelfResult};
use crate::progress;
use crate::shelf::machine;
use crate::shelf::storage::{Catalog, ShelfStore};
use crate::shelf::views::{Mutation, ShelfChange};
use crate::stats::totals::books_read_in;
use crate::stats::{GoalPace, ReadingCalendar, ShelfCounts, ShelfStats, build_calendar};

/// A lost race is retried once against a fresh read before it is surfaced.
const MAX_ATTEMPTS: u32 = 2;
const CHANGE_CAPACITY: usize = 256;

/// Outcome of one read-modify-write against the store.
struct Applied {
    before: Option<ShelfEntry>,
    after: Option<ShelfEntry>,
    written: bool,
}

/// The entry point for every shelf operation a reader can perform.
///
/// Writes go through [`machine::transition`] or [`progress::set_progress`]
/// and land in the store as conditional upserts. Reads pull a snapshot of
/// the reader's entries and run the aggregators in [`crate::stats`].
/// Every committed write is announced on [`ShelfManager::subscribe`].
pub struct ShelfManager<S, C, K = SystemClock> {
    store: S,
    catalog: C,
    clock: K,
    changes: broadcast::Sender<ShelfChange>,
}

impl<S: ShelfStore, C: Catalog> ShelfManager<S, C> {
    /// Creates a manager dated by the system's UTC clock.
    pub fn new(store: S, catalog: C) -> Self {
        Self::with_clock(store, catalog, SystemClock)
    }
}

impl<S: ShelfStore, C: Catalog, K: Clock> ShelfManager<S, C, K> {
    pub fn with_clock(store: S, catalog: C, clock: K) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        ShelfManager {
            store,
            catalog,
            clock,
            changes,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Receives a [`ShelfChange`] for every committed write.
    pub fn subscribe(&self) -> broadcast::Receiver<ShelfChange> {
        self.changes.subscribe()
    }

    /// Moves a book to another shelf, or off the shelf when `status` is `None`.
    ///
    /// `current_page` overrides the page the transition would pick.
    ///
    /// # Errors
    /// - [`ShelfError::BookNotFound`] if the catalog does not know the book
    /// - [`ShelfError::InvalidProgress`] / [`ShelfError::ProgressExceedsPageCount`]
    ///   for a bad `current_page`
    /// - [`ShelfError::StoreConflict`] if a concurrent update won twice
    pub async fn update_status(
        &self,
        user: &UserId,
        book: BookId,
        status: Option<ShelfStatus>,
        current_page: Option<i64>,
    ) -> ShelfResult<Option<ShelfEntry>> {
        let page_count = match status {
            Some(_) => {
                self.catalog
                    .book(book)
                    .await?
                    .ok_or(ShelfError::BookNotFound(book))?
                    .page_count
            }
            None => None,
        };
        let today = self.clock.today();

        let applied = self
            .apply(user, book, |current| {
                machine::transition(current, book, page_count, status, current_page, today)
            })
            .await?;

        if applied.written {
            let before = applied.before.as_ref().map(|e| e.status);
            let after = applied.after.as_ref().map(|e| e.status);
            let mutation = match after {
                None => Mutation::Removal,
                Some(_) if machine::changes_status(before, after) => Mutation::StatusChange,
                Some(_) => Mutation::ProgressChange,
            };

            info!(
                user = %user,
                book = %book,
                from = ?before,
                to = ?after,
                page = ?applied.after.as_ref().map(|e| e.current_page),
                "shelf status updated"
            );
            self.publish(user, Some(book), mutation);
        }

        Ok(applied.after)
    }

    /// Records the page a reader is on, leaving the shelf unchanged.
    ///
    /// # Errors
    /// - [`ShelfError::EntryNotFound`] if the book is not shelved
    /// - [`ShelfError::InvalidProgress`] / [`ShelfError::ProgressExceedsPageCount`]
    pub async fn update_progress(
        &self,
        user: &UserId,
        book: BookId,
        current_page: i64,
    ) -> ShelfResult<ShelfEntry> {
        let applied = self
            .apply(user, book, |current| {
                let entry = current.ok_or(ShelfError::EntryNotFound(book))?;
                let progress = progress::set_progress(entry, current_page)?;
                let mut next = entry.clone();
                next.current_page = progress.page;
                Ok(Some(next))
            })
            .await?;

        let entry = applied.after.ok_or(ShelfError::EntryNotFound(book))?;
        if applied.written {
            info!(user = %user, book = %book, page = entry.current_page, "reading progress updated");
            self.publish(user, Some(book), Mutation::ProgressChange);
        }
        Ok(entry)
    }

    /// Takes a book off the reader's shelves. Unshelved books are left alone.
    pub async fn remove_from_shelf(&self, user: &UserId, book: BookId) -> ShelfResult<()> {
        self.update_status(user, book, None, None).await?;
        Ok(())
    }

    /// Sets or clears (`None`) the star rating of a shelved book.
    ///
    /// # Errors
    /// - [`ShelfError::InvalidRating`] outside `1..=5`
    /// - [`ShelfError::EntryNotFound`] if the book is not shelved
    pub async fn rate_book(
        &self,
        user: &UserId,
        book: BookId,
        rating: Option<i64>,
    ) -> ShelfResult<ShelfEntry> {
        let rating = rating.map(Rating::new).transpose()?;

        let applied = self
            .apply(user, book, |current| {
                let mut next = current.ok_or(ShelfError::EntryNotFound(book))?.clone();
                next.rating = rating;
                Ok(Some(next))
            })
            .await?;

        let entry = applied.after.ok_or(ShelfError::EntryNotFound(book))?;
        if applied.written {
            info!(user = %user, book = %book, rating = ?entry.rating.map(|r| r.value()), "book rated");
            self.publish(user, Some(book), Mutation::RatingChange);
        }
        Ok(entry)
    }

    /// Sets this year's goal.
    ///
    /// # Errors
    /// - [`ShelfError::InvalidGoal`] outside `1..=365`
    pub async fn set_reading_goal(&self, user: &UserId, goal: i64) -> ShelfResult<ReadingGoal> {
        let goal = ReadingGoal::validate(goal)?;
        let year = self.clock.today().year();

        self.store.put_goal(user, year, goal).await?;
        info!(user = %user, year, goal, "reading goal set");
        self.publish(user, None, Mutation::GoalSet);

        Ok(ReadingGoal {
            goal,
            year,
            books_read: self.books_read(user, year).await?,
        })
    }

    /// This year's goal, or `None` if the reader never set one.
    pub async fn reading_goal(&self, user: &UserId) -> ShelfResult<Option<ReadingGoal>> {
        let year = self.clock.today().year();
        let Some(goal) = self.store.goal(user, year).await? else {
            return Ok(None);
        };

        Ok(Some(ReadingGoal {
            goal,
            year,
            books_read: self.books_read(user, year).await?,
        }))
    }

    /// Pace figures for this year's goal, or `None` without a goal.
    pub async fn goal_pace(&self, user: &UserId) -> ShelfResult<Option<GoalPace>> {
        let today = self.clock.today();
        Ok(self
            .reading_goal(user)
            .await?
            .map(|goal| GoalPace::for_date(goal.goal, goal.books_read, goal.year, today)))
    }

    pub async fn shelf_counts(&self, user: &UserId) -> ShelfResult<ShelfCounts> {
        let entries = self.store.entries(user).await?;
        Ok(ShelfCounts::tally(&entries))
    }

    /// Books on one shelf with their catalog summaries, first shelved first.
    pub async fn shelf_books(&self, user: &UserId, status: ShelfStatus) -> ShelfResult<Vec<ShelfBook>> {
        let entries = self.store.entries_with_status(user, status).await?;
        debug!(user = %user, shelf = %status, count = entries.len(), "loaded shelf");

        let mut books = Vec::with_capacity(entries.len());
        for entry in entries {
            books.push(self.enrich(entry).await?);
        }
        Ok(books)
    }

    /// Books finished in `year`/`month`, grouped by finish date.
    pub async fn reading_calendar(
        &self,
        user: &UserId,
        year: i32,
        month: u32,
    ) -> ShelfResult<ReadingCalendar<ShelfBook>> {
        let entries = self.store.entries_with_status(user, ShelfStatus::Read).await?;
        let calendar = build_calendar(entries, year, month);

        let mut enriched = ReadingCalendar::empty();
        enriched.total_books = calendar.total_books;
        for (date, day) in calendar.books_by_day {
            let mut books = Vec::with_capacity(day.len());
            for entry in day {
                books.push(self.enrich(entry).await?);
            }
            enriched.books_by_day.insert(date, books);
        }
        Ok(enriched)
    }

    /// This year's totals.
    pub async fn stats(&self, user: &UserId) -> ShelfResult<ShelfStats> {
        let year = self.clock.today().year();
        let entries = self.store.entries(user).await?;
        Ok(ShelfStats::compute(&entries, year))
    }

    async fn books_read(&self, user: &UserId, year: i32) -> ShelfResult<u32> {
        let read = self.store.entries_with_status(user, ShelfStatus::Read).await?;
        Ok(books_read_in(&read, year))
    }

    async fn enrich(&self, entry: ShelfEntry) -> ShelfResult<ShelfBook> {
        let book = self
            .catalog
            .book(entry.book_id)
            .await?
            .as_ref()
            .map(BookSummary::from);
        Ok(ShelfBook { entry, book })
    }

    /// Reads the entry, lets `plan` decide its next state and writes it back
    /// conditionally. Nothing is written when the plan leaves the entry as it
    /// was.
    async fn apply<F>(&self, user: &UserId, book: BookId, mut plan: F) -> ShelfResult<Applied>
    where
        F: FnMut(Option<&ShelfEntry>) -> ShelfResult<Option<ShelfEntry>>,
    {
        let mut attempt = 1;
        loop {
            let stored = self.store.entry(user, book).await?;
            let version = stored.as_ref().map(|s| s.version);
            let before = stored.map(|s| s.entry);
            let after = plan(before.as_ref())?;

            if after == before {
                return Ok(Applied {
                    before,
                    after,
                    written: false,
                });
            }

            let outcome = match (&after, version) {
                (Some(entry), version) => self.store.put_entry(user, entry, version).await.map(|_| ()),
                (None, Some(version)) => self.store.delete_entry(user, book, version).await,
                (None, None) => Ok(()),
            };

            match outcome {
                Ok(()) => {
                    return Ok(Applied {
                        before,
                        after,
                        written: true,
                    });
                }
                Err(ShelfError::StoreConflict(_)) if attempt < MAX_ATTEMPTS => {
                    warn!(user = %user, book = %book, attempt, "shelf write conflicted, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn publish(&self, user: &UserId, book: Option<BookId>, mutation: Mutation) {
        // no subscribers is fine
        let _ = self.changes.send(ShelfChange {
            user: user.clone(),
            book,
            mutation,
        });
    }
}
