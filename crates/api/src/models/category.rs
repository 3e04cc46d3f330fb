//! Category domain types.

use newsdesk_core::CategoryId;

/// An article category (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    /// Unique name.
    pub name: String,
    pub description: String,
    /// Inactive categories stay attached to their articles but are hidden from pickers.
    pub is_active: bool,
    /// Number of articles filed under this category.
    pub article_count: i64,
}

impl Category {
    /// A category can be deleted only while no article references it.
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        self.article_count == 0
    }
}

/// Values for creating or overwriting a category.
#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}
