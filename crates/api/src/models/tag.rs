//! Tag domain types.

use newsdesk_core::TagId;

/// A tag (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    /// Unique name.
    pub name: String,
    pub note: Option<String>,
    /// Number of articles carrying this tag.
    pub article_count: i64,
}

impl Tag {
    /// A tag can be deleted only while no article carries it.
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        self.article_count == 0
    }
}

/// Values for creating or overwriting a tag.
#[derive(Debug, Clone)]
pub struct TagDraft {
    pub name: String,
    pub note: Option<String>,
}
