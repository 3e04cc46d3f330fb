//! Tag repository for database operations.

use sqlx::SqlitePool;

use newsdesk_core::TagId;

use super::{RepositoryError, map_constraint_error};
use crate::models::tag::{Tag, TagDraft};

const NAME_CONFLICT: &str = "Tag name already exists";
const IN_USE_CONFLICT: &str = "Cannot delete a tag that is used by news articles";

const SELECT_TAG: &str = r"
    SELECT t.id, t.name, t.note,
           (SELECT COUNT(*) FROM news_tag nt WHERE nt.tag_id = t.id) AS article_count
    FROM tag t
";

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    id: i32,
    name: String,
    note: Option<String>,
    article_count: i64,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: TagId::new(row.id),
            name: row.name,
            note: row.note,
            article_count: row.article_count,
        }
    }
}

/// Repository for tag database operations.
pub struct TagRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TagRepository<'a> {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all tags ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Tag>, RepositoryError> {
        let rows = sqlx::query_as::<_, TagRow>(&format!("{SELECT_TAG} ORDER BY t.id"))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a tag by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        let row = sqlx::query_as::<_, TagRow>(&format!("{SELECT_TAG} WHERE t.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Whether another tag already uses `name` (exact match).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_exists(
        &self,
        name: &str,
        exclude: Option<TagId>,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tag WHERE name = ? AND (? IS NULL OR id <> ?))",
        )
        .bind(name)
        .bind(exclude)
        .bind(exclude)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Whether any article carries this tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_articles(&self, id: TagId) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM news_tag WHERE tag_id = ?)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Create a new tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, draft: &TagDraft) -> Result<Tag, RepositoryError> {
        let id = sqlx::query_scalar::<_, TagId>(
            "INSERT INTO tag (name, note) VALUES (?, ?) RETURNING id",
        )
        .bind(&draft.name)
        .bind(draft.note.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, NAME_CONFLICT))?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Overwrite a tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tag does not exist.
    /// Returns `RepositoryError::Conflict` if the name belongs to another tag.
    pub async fn update(&self, id: TagId, draft: &TagDraft) -> Result<Tag, RepositoryError> {
        let result = sqlx::query("UPDATE tag SET name = ?, note = ? WHERE id = ?")
            .bind(&draft.name)
            .bind(draft.note.as_deref())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_constraint_error(e, NAME_CONFLICT))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tag does not exist.
    /// Returns `RepositoryError::Conflict` if an article still carries it.
    pub async fn delete(&self, id: TagId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tag WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_constraint_error(e, IN_USE_CONFLICT))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    #[tokio::test]
    async fn test_note_is_optional() {
        let pool = create_memory_pool().await.unwrap();
        let repo = TagRepository::new(&pool);

        let tag = repo
            .create(&TagDraft {
                name: "breaking".to_string(),
                note: None,
            })
            .await
            .unwrap();

        assert_eq!(tag.note, None);
        assert_eq!(tag.article_count, 0);
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let pool = create_memory_pool().await.unwrap();
        let repo = TagRepository::new(&pool);
        repo.create(&TagDraft {
            name: "AI".to_string(),
            note: None,
        })
        .await
        .unwrap();

        assert!(repo.name_exists("AI", None).await.unwrap());
        assert!(!repo.name_exists("ai", None).await.unwrap());
    }
}
