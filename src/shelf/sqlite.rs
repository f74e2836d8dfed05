use chrono::NaiveDate;
use sqlx::Row;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use std::fs;
use std::str::FromStr;
use tracing::debug;

use crate::config::StoreConfig;
use crate::domain::{Book, BookId, Rating, ShelfEntry, ShelfStatus, StoredEntry, UserId};
use crate::error::{ShelfError, ShelfResult};
use crate::shelf::storage::{Catalog, ShelfStore};

const ENTRY_COLUMNS: &str =
    "book_id, status, current_page, page_count, finished_date, rating, version";

/// A [`ShelfStore`] and [`Catalog`] backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database described by `config` and
    /// brings its schema up to date.
    ///
    /// # Errors
    /// - [`ShelfError::Io`] if the parent directory cannot be created
    /// - [`ShelfError::Db`] if the database cannot be opened
    /// - [`ShelfError::Migrate`] if the schema cannot be applied
    pub async fn open(config: &StoreConfig) -> ShelfResult<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        debug!(path = %config.database_path.display(), "opened shelf database");
        Self::with_pool(pool).await
    }

    /// A private in-memory database, mostly for tests.
    pub async fn open_in_memory() -> ShelfResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // a single connection that never expires, or the database goes with it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> ShelfResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(SqliteStore { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Adds or replaces a catalog record.
    pub async fn insert_book(&self, book: &Book) -> ShelfResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO books (id, title, page_count, cover_url) VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                title = excluded.title,
                page_count = excluded.page_count,
                cover_url = excluded.cover_url",
        )
        .bind(book.id.0)
        .bind(&book.title)
        .bind(book.page_count.map(i64::from))
        .bind(&book.cover_url)
        .execute(&mut *tx)
        .await?;

        for table in ["book_authors", "book_genres"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE book_id = ?"))
                .bind(book.id.0)
                .execute(&mut *tx)
                .await?;
        }

        for (table, names) in [("book_authors", &book.authors), ("book_genres", &book.genres)] {
            for (position, name) in names.iter().enumerate() {
                sqlx::query(&format!(
                    "INSERT INTO {table} (book_id, position, name) VALUES (?, ?, ?)"
                ))
                .bind(book.id.0)
                .bind(position as i64)
                .bind(name)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn names(&self, table: &str, book: BookId) -> ShelfResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(&format!(
            "SELECT name FROM {table} WHERE book_id = ? ORDER BY position"
        ))
        .bind(book.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}

fn column_u32(row: &SqliteRow, column: &str) -> ShelfResult<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(|_| ShelfError::Corrupt(format!("{column} out of range: {value}")))
}

fn column_opt_u32(row: &SqliteRow, column: &str) -> ShelfResult<Option<u32>> {
    let value: Option<i64> = row.try_get(column)?;
    value
        .map(|v| {
            u32::try_from(v).map_err(|_| ShelfError::Corrupt(format!("{column} out of range: {v}")))
        })
        .transpose()
}

fn stored_entry(row: &SqliteRow) -> ShelfResult<StoredEntry> {
    let status: String = row.try_get("status")?;
    let rating: Option<i64> = row.try_get("rating")?;
    let finished_date: Option<NaiveDate> = row.try_get("finished_date")?;
    let version: i64 = row.try_get("version")?;

    let entry = ShelfEntry {
        book_id: BookId(row.try_get("book_id")?),
        status: ShelfStatus::from_str(&status)?,
        current_page: column_u32(row, "current_page")?,
        page_count: column_opt_u32(row, "page_count")?,
        finished_date,
        rating: rating
            .map(|r| Rating::new(r).map_err(|_| ShelfError::Corrupt(format!("rating out of range: {r}"))))
            .transpose()?,
    };

    Ok(StoredEntry {
        entry,
        version: u64::try_from(version)
            .map_err(|_| ShelfError::Corrupt(format!("negative version {version}")))?,
    })
}

fn version_param(version: u64) -> ShelfResult<i64> {
    i64::try_from(version).map_err(|_| ShelfError::Corrupt(format!("version overflow {version}")))
}

impl ShelfStore for SqliteStore {
    async fn entry(&self, user: &UserId, book: BookId) -> ShelfResult<Option<StoredEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM shelf_entries WHERE user_id = ? AND book_id = ?"
        ))
        .bind(user.as_str())
        .bind(book.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(stored_entry).transpose()
    }

    async fn put_entry(
        &self,
        user: &UserId,
        entry: &ShelfEntry,
        expected_version: Option<u64>,
    ) -> ShelfResult<u64> {
        let rating = entry.rating.map(|r| i64::from(r.value()));
        let page_count = entry.page_count.map(i64::from);

        let (result, next) = match expected_version {
            None => {
                let result = sqlx::query(
                    "INSERT INTO shelf_entries
                        (user_id, book_id, status, current_page, page_count, finished_date, rating, version)
                     VALUES (?, ?, ?, ?, ?, ?, ?, 1)
                     ON CONFLICT (user_id, book_id) DO NOTHING",
                )
                .bind(user.as_str())
                .bind(entry.book_id.0)
                .bind(entry.status.as_str())
                .bind(i64::from(entry.current_page))
                .bind(page_count)
                .bind(entry.finished_date)
                .bind(rating)
                .execute(&self.pool)
                .await?;
                (result, 1)
            }
            Some(expected) => {
                let result = sqlx::query(
                    "UPDATE shelf_entries SET
                        status = ?, current_page = ?, page_count = ?, finished_date = ?, rating = ?,
                        version = version + 1, updated_at = CURRENT_TIMESTAMP
                     WHERE user_id = ? AND book_id = ? AND version = ?",
                )
                .bind(entry.status.as_str())
                .bind(i64::from(entry.current_page))
                .bind(page_count)
                .bind(entry.finished_date)
                .bind(rating)
                .bind(user.as_str())
                .bind(entry.book_id.0)
                .bind(version_param(expected)?)
                .execute(&self.pool)
                .await?;
                (result, expected + 1)
            }
        };

        if result.rows_affected() == 0 {
            return Err(ShelfError::StoreConflict(entry.book_id));
        }
        Ok(next)
    }

    async fn delete_entry(&self, user: &UserId, book: BookId, expected_version: u64) -> ShelfResult<()> {
        let result = sqlx::query(
            "DELETE FROM shelf_entries WHERE user_id = ? AND book_id = ? AND version = ?",
        )
        .bind(user.as_str())
        .bind(book.0)
        .bind(version_param(expected_version)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ShelfError::StoreConflict(book));
        }
        Ok(())
    }

    async fn entries(&self, user: &UserId) -> ShelfResult<Vec<ShelfEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM shelf_entries WHERE user_id = ? ORDER BY rowid"
        ))
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| stored_entry(row).map(|s| s.entry)).collect()
    }

    async fn entries_with_status(&self, user: &UserId, status: ShelfStatus) -> ShelfResult<Vec<ShelfEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM shelf_entries
             WHERE user_id = ? AND status = ? ORDER BY rowid"
        ))
        .bind(user.as_str())
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| stored_entry(row).map(|s| s.entry)).collect()
    }

    async fn goal(&self, user: &UserId, year: i32) -> ShelfResult<Option<u32>> {
        let goal: Option<i64> =
            sqlx::query_scalar("SELECT goal FROM reading_goals WHERE user_id = ? AND year = ?")
                .bind(user.as_str())
                .bind(year)
                .fetch_optional(&self.pool)
                .await?;

        goal.map(|g| u32::try_from(g).map_err(|_| ShelfError::Corrupt(format!("goal out of range: {g}"))))
            .transpose()
    }

    async fn put_goal(&self, user: &UserId, year: i32, goal: u32) -> ShelfResult<()> {
        sqlx::query(
            "INSERT INTO reading_goals (user_id, year, goal) VALUES (?, ?, ?)
             ON CONFLICT (user_id, year) DO UPDATE SET
                goal = excluded.goal,
                updated_at = CURRENT_TIMESTAMP",
        )
        .bind(user.as_str())
        .bind(year)
        .bind(i64::from(goal))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl Catalog for SqliteStore {
    async fn book(&self, id: BookId) -> ShelfResult<Option<Book>> {
        let Some(row) = sqlx::query("SELECT id, title, page_count, cover_url FROM books WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(Book {
            id,
            title: row.try_get("title")?,
            page_count: column_opt_u32(&row, "page_count")?,
            cover_url: row.try_get("cover_url")?,
            authors: self.names("book_authors", id).await?,
            genres: self.names("book_genres", id).await?,
        }))
    }
}
