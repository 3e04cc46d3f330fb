//! Article domain types.

use chrono::{DateTime, Utc};

use newsdesk_core::{AccountId, ArticleId, CategoryId, TagId};

/// Name-resolved reference to an article's category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// Name-resolved reference to an article's author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: AccountId,
    pub name: String,
}

/// Name-resolved reference to a tag attached to an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
}

/// A news article with its resolved references (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub headline: String,
    pub content: Option<String>,
    pub source: Option<String>,
    /// Published articles are visible on the public feed.
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub category: Option<CategoryRef>,
    /// Set once at creation. `None` for articles written by the configured admin.
    pub author: Option<AuthorRef>,
    /// Most recent modifier, if that modifier is a persisted account.
    pub updated_by: Option<AccountId>,
    /// Attached tags, ordered by tag ID, without duplicates.
    pub tags: Vec<TagRef>,
}

impl Article {
    #[must_use]
    pub fn tag_ids(&self) -> Vec<TagId> {
        self.tags.iter().map(|tag| tag.id).collect()
    }
}

/// Editable article fields, shared by create and update.
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub title: String,
    pub headline: String,
    pub content: Option<String>,
    pub source: Option<String>,
    pub category_id: Option<CategoryId>,
    pub is_published: bool,
}
