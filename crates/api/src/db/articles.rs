//! Article repository for database operations.
//!
//! Reads go through [`ArticleRepository`]. Writes that must share a
//! transaction with tag reconciliation are free functions taking a
//! `SqliteConnection`, so the caller owns the transaction boundary.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use newsdesk_core::{AccountId, ArticleId, CategoryId, DateRange, TagId};

use super::{RepositoryError, map_constraint_error};
use crate::models::article::{Article, ArticleDraft, AuthorRef, CategoryRef, TagRef};

const REFERENCE_CONFLICT: &str = "Category not found";

const SELECT_ARTICLE: &str = r"
    SELECT n.id, n.title, n.headline, n.content, n.source, n.is_published,
           n.created_at, n.modified_at,
           n.category_id, c.name AS category_name,
           n.created_by_id, a.name AS author_name,
           n.updated_by_id
    FROM news_article n
    LEFT JOIN category c ON c.id = n.category_id
    LEFT JOIN system_account a ON a.id = n.created_by_id
";

/// Which articles a listing may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleScope {
    /// Every article, published or not.
    All,
    /// Only published articles.
    Published,
    /// Articles authored by one account.
    AuthoredBy(AccountId),
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: i32,
    title: String,
    headline: String,
    content: Option<String>,
    source: Option<String>,
    is_published: bool,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    category_id: Option<i32>,
    category_name: Option<String>,
    created_by_id: Option<i32>,
    author_name: Option<String>,
    updated_by_id: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct ArticleTagRow {
    article_id: i32,
    tag_id: i32,
    tag_name: String,
}

impl ArticleRow {
    fn into_article(self, tags: Vec<TagRef>) -> Result<Article, RepositoryError> {
        let category = match (self.category_id, self.category_name) {
            (Some(id), Some(name)) => Some(CategoryRef {
                id: CategoryId::new(id),
                name,
            }),
            (None, _) => None,
            (Some(id), None) => {
                return Err(RepositoryError::DataCorruption(format!(
                    "article {} references missing category {id}",
                    self.id
                )));
            }
        };
        let author = match (self.created_by_id, self.author_name) {
            (Some(id), Some(name)) => Some(AuthorRef {
                id: AccountId::new(id),
                name,
            }),
            (None, _) => None,
            (Some(id), None) => {
                return Err(RepositoryError::DataCorruption(format!(
                    "article {} references missing author {id}",
                    self.id
                )));
            }
        };

        Ok(Article {
            id: ArticleId::new(self.id),
            title: self.title,
            headline: self.headline,
            content: self.content,
            source: self.source,
            is_published: self.is_published,
            created_at: self.created_at,
            modified_at: self.modified_at,
            category,
            author,
            updated_by: self.updated_by_id.map(AccountId::new),
            tags,
        })
    }
}

/// Attach tag rows to their article rows, preserving article order.
fn assemble(
    rows: Vec<ArticleRow>,
    tag_rows: Vec<ArticleTagRow>,
) -> Result<Vec<Article>, RepositoryError> {
    let mut tags_by_article: HashMap<i32, Vec<TagRef>> = HashMap::new();
    for row in tag_rows {
        tags_by_article.entry(row.article_id).or_default().push(TagRef {
            id: TagId::new(row.tag_id),
            name: row.tag_name,
        });
    }

    rows.into_iter()
        .map(|row| {
            let tags = tags_by_article.remove(&row.id).unwrap_or_default();
            row.into_article(tags)
        })
        .collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for article reads and single-statement writes.
pub struct ArticleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ArticleRepository<'a> {
    /// Create a new article repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List articles in `scope`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a reference cannot be resolved.
    pub async fn list(&self, scope: ArticleScope) -> Result<Vec<Article>, RepositoryError> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_ARTICLE);
        match scope {
            ArticleScope::All => {}
            ArticleScope::Published => {
                query.push(" WHERE n.is_published = 1");
            }
            ArticleScope::AuthoredBy(author) => {
                query.push(" WHERE n.created_by_id = ").push_bind(author);
            }
        }
        query.push(" ORDER BY n.created_at DESC, n.id DESC");

        let rows = query
            .build_query_as::<ArticleRow>()
            .fetch_all(self.pool)
            .await?;
        let tag_rows = self.all_tag_rows().await?;

        assemble(rows, tag_rows)
    }

    /// Articles created inside `range`, newest first (ties broken by ID, descending).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a reference cannot be resolved.
    pub async fn created_within(&self, range: &DateRange) -> Result<Vec<Article>, RepositoryError> {
        let lower = range.lower_bound();
        let upper = range.upper_bound_exclusive();

        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "{SELECT_ARTICLE}
             WHERE (? IS NULL OR n.created_at >= ?)
               AND (? IS NULL OR n.created_at < ?)
             ORDER BY n.created_at DESC, n.id DESC"
        ))
        .bind(lower)
        .bind(lower)
        .bind(upper)
        .bind(upper)
        .fetch_all(self.pool)
        .await?;
        let tag_rows = self.all_tag_rows().await?;

        assemble(rows, tag_rows)
    }

    /// Get an article by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a reference cannot be resolved.
    pub async fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>, RepositoryError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!("{SELECT_ARTICLE} WHERE n.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tag_rows = sqlx::query_as::<_, ArticleTagRow>(
            r"
            SELECT nt.article_id, t.id AS tag_id, t.name AS tag_name
            FROM news_tag nt
            JOIN tag t ON t.id = nt.tag_id
            WHERE nt.article_id = ?
            ORDER BY t.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        assemble(vec![row], tag_rows).map(|mut articles| articles.pop())
    }

    /// Delete an article. Its tag associations cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the article does not exist.
    pub async fn delete(&self, id: ArticleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM news_article WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn all_tag_rows(&self) -> Result<Vec<ArticleTagRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ArticleTagRow>(
            r"
            SELECT nt.article_id, t.id AS tag_id, t.name AS tag_name
            FROM news_tag nt
            JOIN tag t ON t.id = nt.tag_id
            ORDER BY nt.article_id, t.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Transaction-scoped Writes
// =============================================================================

/// Insert an article row and return its ID.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the category reference is dangling.
pub async fn insert(
    conn: &mut SqliteConnection,
    draft: &ArticleDraft,
    author: Option<AccountId>,
    now: DateTime<Utc>,
) -> Result<ArticleId, RepositoryError> {
    sqlx::query_scalar::<_, ArticleId>(
        r"
        INSERT INTO news_article
            (title, headline, content, source, is_published, category_id,
             created_by_id, updated_by_id, created_at, modified_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        ",
    )
    .bind(&draft.title)
    .bind(&draft.headline)
    .bind(draft.content.as_deref())
    .bind(draft.source.as_deref())
    .bind(draft.is_published)
    .bind(draft.category_id)
    .bind(author)
    .bind(author)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| map_constraint_error(e, REFERENCE_CONFLICT))
}

/// Overwrite an article's editable fields, record the modifier and refresh
/// `modified_at`. The author is never touched.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the article does not exist.
/// Returns `RepositoryError::Conflict` if the category reference is dangling.
pub async fn update(
    conn: &mut SqliteConnection,
    id: ArticleId,
    draft: &ArticleDraft,
    modifier: Option<AccountId>,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE news_article
        SET title = ?, headline = ?, content = ?, source = ?, is_published = ?,
            category_id = ?, updated_by_id = ?, modified_at = ?
        WHERE id = ?
        ",
    )
    .bind(&draft.title)
    .bind(&draft.headline)
    .bind(draft.content.as_deref())
    .bind(draft.source.as_deref())
    .bind(draft.is_published)
    .bind(draft.category_id)
    .bind(modifier)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await
    .map_err(|e| map_constraint_error(e, REFERENCE_CONFLICT))?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Tag IDs currently attached to an article.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn attached_tag_ids(
    conn: &mut SqliteConnection,
    article: ArticleId,
) -> Result<Vec<TagId>, RepositoryError> {
    let ids = sqlx::query_scalar::<_, TagId>(
        "SELECT tag_id FROM news_tag WHERE article_id = ? ORDER BY tag_id",
    )
    .bind(article)
    .fetch_all(conn)
    .await?;

    Ok(ids)
}

/// The subset of `requested` that exists in the tag table.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn existing_tag_ids(
    conn: &mut SqliteConnection,
    requested: &[TagId],
) -> Result<HashSet<TagId>, RepositoryError> {
    if requested.is_empty() {
        return Ok(HashSet::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new("SELECT id FROM tag WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in requested {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let ids = query.build_query_scalar::<TagId>().fetch_all(conn).await?;
    Ok(ids.into_iter().collect())
}

/// Attach one tag to an article. Attaching an existing pair is a no-op.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the statement fails.
pub async fn attach_tag(
    conn: &mut SqliteConnection,
    article: ArticleId,
    tag: TagId,
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT OR IGNORE INTO news_tag (article_id, tag_id) VALUES (?, ?)")
        .bind(article)
        .bind(tag)
        .execute(conn)
        .await?;
    Ok(())
}

/// Detach one tag from an article.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the statement fails.
pub async fn detach_tag(
    conn: &mut SqliteConnection,
    article: ArticleId,
    tag: TagId,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM news_tag WHERE article_id = ? AND tag_id = ?")
        .bind(article)
        .bind(tag)
        .execute(conn)
        .await?;
    Ok(())
}
