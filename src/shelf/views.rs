//! Which read views each write can make stale.
//!
//! Writes never broadcast a blanket "something changed"; every
//! [`ShelfChange`] names the views that must be refreshed.

use serde::{Deserialize, Serialize};

use crate::domain::{BookId, UserId};

/// A read-side view exposed by [`crate::shelf::manager::ShelfManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadView {
    /// `shelf_counts`
    Counts,
    /// `shelf_books`
    ShelfBooks,
    /// `stats`
    Stats,
    /// `reading_calendar`
    Calendar,
    /// `reading_goal` and `goal_pace`
    Goal,
}

/// The kind of write that happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    StatusChange,
    ProgressChange,
    Removal,
    RatingChange,
    GoalSet,
}

impl Mutation {
    pub fn affected_views(self) -> &'static [ReadView] {
        match self {
            Mutation::StatusChange | Mutation::Removal => &[
                ReadView::Counts,
                ReadView::ShelfBooks,
                ReadView::Stats,
                ReadView::Calendar,
                ReadView::Goal,
            ],
            // the page sum in stats and the page shown on the shelf
            Mutation::ProgressChange => &[ReadView::Stats, ReadView::ShelfBooks],
            Mutation::RatingChange => &[ReadView::ShelfBooks],
            Mutation::GoalSet => &[ReadView::Goal],
        }
    }

    pub fn affects(self, view: ReadView) -> bool {
        self.affected_views().contains(&view)
    }
}

/// Published after every committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfChange {
    pub user: UserId,
    pub book: Option<BookId>,
    pub mutation: Mutation,
}

impl ShelfChange {
    pub fn views(&self) -> &'static [ReadView] {
        self.mutation.affected_views()
    }
}
