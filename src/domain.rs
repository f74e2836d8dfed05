use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ShelfError, ShelfResult};

/// Opaque catalog identifier of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the acting reader, already resolved by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The shelf a book sits on.
///
/// A book that is not shelved has no [`ShelfEntry`] at all; there is no
/// "none" status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfStatus {
    WantToRead,
    CurrentlyReading,
    Read,
    Dnf,
}

impl ShelfStatus {
    pub const ALL: [ShelfStatus; 4] = [
        ShelfStatus::WantToRead,
        ShelfStatus::CurrentlyReading,
        ShelfStatus::Read,
        ShelfStatus::Dnf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShelfStatus::WantToRead => "want_to_read",
            ShelfStatus::CurrentlyReading => "currently_reading",
            ShelfStatus::Read => "read",
            ShelfStatus::Dnf => "dnf",
        }
    }
}

impl fmt::Display for ShelfStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShelfStatus {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "want_to_read" => Ok(ShelfStatus::WantToRead),
            "currently_reading" => Ok(ShelfStatus::CurrentlyReading),
            "read" => Ok(ShelfStatus::Read),
            "dnf" => Ok(ShelfStatus::Dnf),
            other => Err(ShelfError::Corrupt(format!("unknown shelf status '{other}'"))),
        }
    }
}

/// A star rating between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(rating: i64) -> ShelfResult<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&rating) {
            Ok(Rating(rating as u8))
        } else {
            Err(ShelfError::InvalidRating { rating })
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ShelfError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// One shelved book for one reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfEntry {
    pub book_id: BookId,
    pub status: ShelfStatus,
    pub current_page: u32,
    pub page_count: Option<u32>,
    pub finished_date: Option<NaiveDate>,
    pub rating: Option<Rating>,
}

impl ShelfEntry {
    /// A freshly shelved book: page zero, not finished, unrated.
    pub fn new(book_id: BookId, status: ShelfStatus, page_count: Option<u32>) -> Self {
        ShelfEntry {
            book_id,
            status,
            current_page: 0,
            page_count,
            finished_date: None,
            rating: None,
        }
    }

    /// True if this entry counts as a finish inside `year`.
    pub fn finished_in(&self, year: i32) -> bool {
        use chrono::Datelike;

        self.status == ShelfStatus::Read
            && self.finished_date.is_some_and(|d| d.year() == year)
    }
}

impl AsRef<ShelfEntry> for ShelfEntry {
    fn as_ref(&self) -> &ShelfEntry {
        self
    }
}

/// A shelf entry as held by a store, tagged with the version used for
/// conditional writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub entry: ShelfEntry,
    pub version: u64,
}

/// A reader's yearly goal together with how far they have got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingGoal {
    pub goal: u32,
    pub year: i32,
    pub books_read: u32,
}

impl ReadingGoal {
    pub const MIN_GOAL: i64 = 1;
    pub const MAX_GOAL: i64 = 365;

    /// Validates a requested goal, returning it as a book count.
    pub fn validate(goal: i64) -> ShelfResult<u32> {
        if (Self::MIN_GOAL..=Self::MAX_GOAL).contains(&goal) {
            Ok(goal as u32)
        } else {
            Err(ShelfError::InvalidGoal { goal })
        }
    }
}

/// Catalog record of a book. Read-only to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub page_count: Option<u32>,
    pub cover_url: Option<String>,
    pub authors: Vec<String>,
    pub genres: Vec<String>,
}

/// Display facts attached to shelf results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub title: String,
    pub page_count: Option<u32>,
    pub cover_url: Option<String>,
    pub authors: Vec<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        BookSummary {
            title: book.title.clone(),
            page_count: book.page_count,
            cover_url: book.cover_url.clone(),
            authors: book.authors.clone(),
        }
    }
}

/// A shelf entry enriched with catalog facts. `book` is `None` when the
/// catalog no longer knows the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfBook {
    #[serde(flatten)]
    pub entry: ShelfEntry,
    pub book: Option<BookSummary>,
}

impl AsRef<ShelfEntry> for ShelfBook {
    fn as_ref(&self) -> &ShelfEntry {
        &self.entry
    }
}
