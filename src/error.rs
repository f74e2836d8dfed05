use thiserror::Error;

use crate::domain::BookId;

#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("invalid progress: {0}")]
    InvalidProgress(String),

    #[error("page {requested} is beyond the book's {page_count} pages")]
    ProgressExceedsPageCount { requested: u32, page_count: u32 },

    #[error("invalid reading goal {goal}: goal must be between 1 and 365 books")]
    InvalidGoal { goal: i64 },

    #[error("invalid rating {rating}: rating must be between 1 and 5")]
    InvalidRating { rating: i64 },

    #[error("book not found: {0}")]
    BookNotFound(BookId),

    #[error("book {0} is not on the shelf")]
    EntryNotFound(BookId),

    #[error("concurrent update lost the race for book {0}")]
    StoreConflict(BookId),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("corrupt shelf record: {0}")]
    Corrupt(String),
}

impl ShelfError {
    /// True for the not-found family, so callers can map both catalog and
    /// shelf misses onto one response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShelfError::BookNotFound(_) | ShelfError::EntryNotFound(_))
    }

    /// True when retrying the whole operation later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ShelfError::StoreConflict(_) => true,
            ShelfError::Db(sqlx::Error::PoolTimedOut) => true,
            _ => false,
        }
    }
}

pub type ShelfResult<T> = Result<T, ShelfError>;
