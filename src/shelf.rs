//! Shelf writes and the stores behind them.
//!
//! - [`machine`] decides what a status change does to an entry
//! - [`manager`] runs reader operations against a store and a catalog
//! - [`storage`] defines the store/catalog traits and in-memory versions
//! - [`sqlite`] is the SQLite-backed store
//! - [`views`] maps each kind of write to the read views it invalidates

pub mod machine;
pub mod manager;
pub mod sqlite;
pub mod storage;
pub mod views;

pub use manager::ShelfManager;
pub use sqlite::SqliteStore;
pub use storage::{Catalog, MemoryCatalog, MemoryStore, ShelfStore};
pub use views::{Mutation, ReadView, ShelfChange};
