//! # shelf_core
//!
//! The rules engine behind a reader's bookshelves: which shelf a book is on,
//! what page the reader reached, how they are doing against a yearly goal,
//! and what they finished when.
//!
//! ## Features
//!
//! - **Shelf status machine**: Want to read, currently reading, read and
//!   did-not-finish, with the page and finish-date side effects of each move
//! - **Progress tracking**: Page validation against the catalog's page count
//! - **Reading goals**: Yearly goals with pace, expected-by-now and required
//!   books per day
//! - **Aggregations**: Monthly finish calendar, yearly stats and shelf badges
//! - **Pluggable storage**: In-memory and SQLite stores behind one trait, with
//!   conditional writes so concurrent updates never tear an entry
//! - **Precise invalidation**: Every write announces exactly which views it
//!   made stale
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shelf_core::domain::{Book, BookId, ShelfStatus, UserId};
//! use shelf_core::shelf::{MemoryCatalog, MemoryStore, ShelfManager};
//!
//! # async fn run() -> shelf_core::ShelfResult<()> {
//! let catalog = MemoryCatalog::default().with_book(Book {
//!     id: BookId(1),
//!     title: "Dune".into(),
//!     page_count: Some(412),
//!     cover_url: None,
//!     authors: vec!["Frank Herbert".into()],
//!     genres: vec!["science fiction".into()],
//! });
//! let shelves = ShelfManager::new(MemoryStore::new(), catalog);
//! let reader = UserId::new("reader-1");
//!
//! shelves
//!     .update_status(&reader, BookId(1), Some(ShelfStatus::CurrentlyReading), None)
//!     .await?;
//! shelves.update_progress(&reader, BookId(1), 120).await?;
//! shelves
//!     .update_status(&reader, BookId(1), Some(ShelfStatus::Read), None)
//!     .await?;
//!
//! let stats = shelves.stats(&reader).await?;
//! assert_eq!(stats.pages_read_this_year, 412);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **[`domain`]**: Entries, goals, book records and identifiers
//! - **[`progress`]**: Page validation and percentages
//! - **[`shelf`]**: The status machine, the manager and the stores
//! - **[`stats`]**: Goal pace, calendar and totals
//! - **[`config`]**: Store configuration
//! - **[`clock`]**: Where "today" comes from
//! - **[`error`]**: Unified error handling
//!
//! ## Persistence
//!
//! [`shelf::SqliteStore`] keeps entries, goals and a catalog table in one
//! SQLite file. The schema lives in `migrations/` and is applied on open.
//!
//! ```rust,no_run
//! use shelf_core::config::StoreConfig;
//! use shelf_core::shelf::{SqliteStore, ShelfManager};
//!
//! # async fn run() -> shelf_core::ShelfResult<()> {
//! let config = StoreConfig::from_env()?;
//! let store = SqliteStore::open(&config).await?;
//! let shelves = ShelfManager::new(store.clone(), store);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`ShelfResult<T>`] which wraps [`ShelfError`].
//! Validation errors are raised before anything is written; read views
//! report missing data as zeros and empty lists.

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod progress;
pub mod shelf;
pub mod stats;

/// Re-exports the most commonly used types for convenience.
pub use error::{ShelfError, ShelfResult};
