//! Category repository for database operations.

use sqlx::SqlitePool;

use newsdesk_core::CategoryId;

use super::{RepositoryError, map_constraint_error};
use crate::models::category::{Category, CategoryDraft};

const NAME_CONFLICT: &str = "Category name already exists";
const IN_USE_CONFLICT: &str = "Cannot delete a category that has news articles";

const SELECT_CATEGORY: &str = r"
    SELECT c.id, c.name, c.description, c.is_active,
           (SELECT COUNT(*) FROM news_article n WHERE n.category_id = c.id) AS article_count
    FROM category c
";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    description: String,
    is_active: bool,
    article_count: i64,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            article_count: row.article_count,
        }
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all categories ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!("{SELECT_CATEGORY} ORDER BY c.id"))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!("{SELECT_CATEGORY} WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Whether another category already uses `name` (exact match).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_exists(
        &self,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM category WHERE name = ? AND (? IS NULL OR id <> ?))",
        )
        .bind(name)
        .bind(exclude)
        .bind(exclude)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Whether any article is filed under this category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_articles(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM news_article WHERE category_id = ?)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, draft: &CategoryDraft) -> Result<Category, RepositoryError> {
        let id = sqlx::query_scalar::<_, CategoryId>(
            "INSERT INTO category (name, description, is_active) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, NAME_CONFLICT))?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Overwrite a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if the name belongs to another category.
    pub async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        let result = sqlx::query(
            "UPDATE category SET name = ?, description = ?, is_active = ? WHERE id = ?",
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.is_active)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, NAME_CONFLICT))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if an article still references it.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE id = ?")
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

    fn draft(name: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.to_string(),
            description: "Desk".to_string(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_update_to_own_name_succeeds() {
        let pool = create_memory_pool().await.unwrap();
        let repo = CategoryRepository::new(&pool);
        let politics = repo.create(&draft("Politics")).await.unwrap();

        let mut same = draft("Politics");
        same.is_active = false;
        let updated = repo.update(politics.id, &same).await.unwrap();

        assert!(!updated.is_active);
        assert!(!repo.name_exists("Politics", Some(politics.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_into_other_name_is_conflict() {
        let pool = create_memory_pool().await.unwrap();
        let repo = CategoryRepository::new(&pool);
        repo.create(&draft("Sport")).await.unwrap();
        let tech = repo.create(&draft("Tech")).await.unwrap();

        let err = repo.update(tech.id, &draft("Sport")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(msg) if msg == NAME_CONFLICT));
    }

    #[tokio::test]
    async fn test_delete_then_lookup_is_none() {
        let pool = create_memory_pool().await.unwrap();
        let repo = CategoryRepository::new(&pool);
        let culture = repo.create(&draft("Culture")).await.unwrap();

        repo.delete(culture.id).await.unwrap();
        assert!(repo.get_by_id(culture.id).await.unwrap().is_none());
    }
}
