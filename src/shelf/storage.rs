use std::collections::HashMap;
use std::future::Future;
use tokio::sync::Mutex;

use crate::domain::{Book, BookId, ShelfEntry, ShelfStatus, StoredEntry, UserId};
use crate::error::{ShelfError, ShelfResult};

/// Durable home of shelf entries and reading goals.
///
/// Writes are conditional: callers pass the version they read
/// (`None` when they saw no entry) and the store refuses the write with
/// [`ShelfError::StoreConflict`] if the record moved on in the meantime.
/// That keeps at most one committed entry per (user, book) and rules out
/// torn states under concurrent updates.
pub trait ShelfStore: Send + Sync {
    /// Loads one entry with its version.
    fn entry(
        &self,
        user: &UserId,
        book: BookId,
    ) -> impl Future<Output = ShelfResult<Option<StoredEntry>>> + Send;

    /// Inserts (`expected_version == None`) or replaces an entry and returns
    /// the new version.
    fn put_entry(
        &self,
        user: &UserId,
        entry: &ShelfEntry,
        expected_version: Option<u64>,
    ) -> impl Future<Output = ShelfResult<u64>> + Send;

    /// Deletes an entry still at `expected_version`.
    fn delete_entry(
        &self,
        user: &UserId,
        book: BookId,
        expected_version: u64,
    ) -> impl Future<Output = ShelfResult<()>> + Send;

    /// All entries of a user, in the order they were first shelved.
    fn entries(&self, user: &UserId) -> impl Future<Output = ShelfResult<Vec<ShelfEntry>>> + Send;

    /// Entries on one shelf, in the order they were first shelved.
    fn entries_with_status(
        &self,
        user: &UserId,
        status: ShelfStatus,
    ) -> impl Future<Output = ShelfResult<Vec<ShelfEntry>>> + Send;

    /// The stored goal for `year`, if one was ever set.
    fn goal(&self, user: &UserId, year: i32) -> impl Future<Output = ShelfResult<Option<u32>>> + Send;

    /// Creates or replaces the goal for `year`.
    fn put_goal(
        &self,
        user: &UserId,
        year: i32,
        goal: u32,
    ) -> impl Future<Output = ShelfResult<()>> + Send;
}

/// Read-only source of book facts.
pub trait Catalog: Send + Sync {
    fn book(&self, id: BookId) -> impl Future<Output = ShelfResult<Option<Book>>> + Send;
}

struct Slot {
    entry: ShelfEntry,
    version: u64,
    seq: u64,
}

#[derive(Default)]
struct MemoryState {
    entries: HashMap<(UserId, BookId), Slot>,
    goals: HashMap<(UserId, i32), u32>,
    next_seq: u64,
}

impl MemoryState {
    fn sorted(&self, user: &UserId, status: Option<ShelfStatus>) -> Vec<ShelfEntry> {
        let mut slots: Vec<&Slot> = self
            .entries
            .iter()
            .filter(|((owner, _), slot)| {
                owner == user && status.is_none_or(|s| slot.entry.status == s)
            })
            .map(|(_, slot)| slot)
            .collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| slot.entry.clone()).collect()
    }
}

/// A [`ShelfStore`] kept in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShelfStore for MemoryStore {
    async fn entry(&self, user: &UserId, book: BookId) -> ShelfResult<Option<StoredEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .entries
            .get(&(user.clone(), book))
            .map(|slot| StoredEntry {
                entry: slot.entry.clone(),
                version: slot.version,
            }))
    }

    async fn put_entry(
        &self,
        user: &UserId,
        entry: &ShelfEntry,
        expected_version: Option<u64>,
    ) -> ShelfResult<u64> {
        let mut state = self.state.lock().await;
        let key = (user.clone(), entry.book_id);

        let current = state.entries.get(&key).map(|slot| slot.version);

        match (current, expected_version) {
            (None, None) => {
                state.next_seq += 1;
                let seq = state.next_seq;
                state.entries.insert(
                    key,
                    Slot {
                        entry: entry.clone(),
                        version: 1,
                        seq,
                    },
                );
                Ok(1)
            }
            (Some(version), Some(expected)) if version == expected => {
                let next = version + 1;
                if let Some(slot) = state.entries.get_mut(&key) {
                    slot.entry = entry.clone();
                    slot.version = next;
                }
                Ok(next)
            }
            _ => Err(ShelfError::StoreConflict(entry.book_id)),
        }
    }

    async fn delete_entry(&self, user: &UserId, book: BookId, expected_version: u64) -> ShelfResult<()> {
        let mut state = self.state.lock().await;
        let key = (user.clone(), book);

        match state.entries.get(&key) {
            Some(slot) if slot.version == expected_version => {
                state.entries.remove(&key);
                Ok(())
            }
            _ => Err(ShelfError::StoreConflict(book)),
        }
    }

    async fn entries(&self, user: &UserId) -> ShelfResult<Vec<ShelfEntry>> {
        Ok(self.state.lock().await.sorted(user, None))
    }

    async fn entries_with_status(&self, user: &UserId, status: ShelfStatus) -> ShelfResult<Vec<ShelfEntry>> {
        Ok(self.state.lock().await.sorted(user, Some(status)))
    }

    async fn goal(&self, user: &UserId, year: i32) -> ShelfResult<Option<u32>> {
        Ok(self.state.lock().await.goals.get(&(user.clone(), year)).copied())
    }

    async fn put_goal(&self, user: &UserId, year: i32, goal: u32) -> ShelfResult<()> {
        self.state.lock().await.goals.insert((user.clone(), year), goal);
        Ok(())
    }
}

/// A fixed, in-memory [`Catalog`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    books: HashMap<BookId, Book>,
}

impl MemoryCatalog {
    pub fn new(books: impl IntoIterator<Item = Book>) -> Self {
        MemoryCatalog {
            books: books.into_iter().map(|book| (book.id, book)).collect(),
        }
    }

    pub fn with_book(mut self, book: Book) -> Self {
        self.books.insert(book.id, book);
        self
    }
}

impl Catalog for MemoryCatalog {
    async fn book(&self, id: BookId) -> ShelfResult<Option<Book>> {
        Ok(self.books.get(&id).cloned())
    }
}
