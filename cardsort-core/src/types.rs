/// Shared types for the cardsort ranking engine.
///
/// Items are identified by caller-provided `i64` IDs. Display metadata
/// (name, image reference, tags) rides along untouched — the algorithm only
/// ever looks at the ID.
use thiserror::Error;

/// An associated tag record, carried for display and pre-session filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// One item under comparison.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    /// Caller-provided ID. Must be unique within a session.
    pub id: i64,
    pub name: String,
    /// Optional image reference (a URL or path — opaque to this crate).
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<Tag>,
}

impl Item {
    /// Item with no image and no tags — the common case for test fixtures
    /// and line-per-name input.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Item {
            id,
            name: name.into(),
            image: None,
            tags: Vec::new(),
        }
    }
}

/// An unordered pair in presentation orientation: (left id, right id).
pub type Pair = (i64, i64);

/// One tie group of the final ranking.
///
/// Groups are ordered most wins first; every member of a group has the same
/// win count.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankGroup {
    pub members: Vec<Item>,
    /// Win count shared by every member (beaten items after closure).
    pub wins: usize,
}

/// A user judgment on the current pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Judgment {
    LeftWins,
    RightWins,
    /// No evidence of order. A tie does not force the two items into the
    /// same final group; win counts alone decide grouping.
    Tie,
}

/// Errors surfaced by session construction and resume.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SorterError {
    /// The item list contains the same ID twice.
    #[error("duplicate item ID {0}")]
    DuplicateItemId(i64),
    /// A restored state and the supplied item list disagree on which items
    /// exist (stale token, or a different item set than the one that
    /// started the session).
    #[error("restored state and item list disagree on item ID {0}")]
    StateItemMismatch(i64),
    /// A restored state violates an internal invariant and cannot be
    /// trusted. Start a fresh session instead.
    #[error("restored state is corrupt: {0}")]
    CorruptState(String),
}
