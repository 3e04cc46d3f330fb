//! Category management.

use sqlx::SqlitePool;

use newsdesk_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::AppError;
use crate::models::{Category, CategoryDraft};
use crate::services::validation::{Violations, ensure_deletable, ensure_unique, not_found};

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 250;

/// Raw category fields from a request.
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CategoryInput {
    fn validate(self) -> Result<CategoryDraft, AppError> {
        let mut violations = Violations::new();
        violations
            .required("categoryName", self.name.as_deref())
            .max_len("categoryName", self.name.as_deref(), MAX_NAME_LENGTH)
            .required("categoryDescription", self.description.as_deref())
            .max_len(
                "categoryDescription",
                self.description.as_deref(),
                MAX_DESCRIPTION_LENGTH,
            );
        violations.finish()?;

        Ok(CategoryDraft {
            name: self.name.unwrap_or_default().trim().to_string(),
            description: self.description.unwrap_or_default().trim().to_string(),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

pub struct CategoryService<'a> {
    categories: CategoryRepository<'a>,
}

impl<'a> CategoryService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            categories: CategoryRepository::new(pool),
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the read fails.
    pub async fn list(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.categories.list_all().await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category does not exist.
    pub async fn get(&self, id: CategoryId) -> Result<Category, AppError> {
        self.categories
            .get_by_id(id)
            .await?
            .ok_or_else(not_found::<CategoryRepository<'_>>)
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for invalid input or `AppError::Conflict`
    /// if the name is taken.
    pub async fn create(&self, input: CategoryInput) -> Result<Category, AppError> {
        let draft = input.validate()?;
        ensure_unique(&self.categories, &draft.name, None).await?;

        let category = self.categories.create(&draft).await?;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound`, `AppError::BadRequest`, or
    /// `AppError::Conflict` if another category has the name.
    pub async fn update(&self, id: CategoryId, input: CategoryInput) -> Result<Category, AppError> {
        self.get(id).await?;
        let draft = input.validate()?;
        ensure_unique(&self.categories, &draft.name, Some(id)).await?;

        let category = self.categories.update(id, &draft).await?;
        tracing::info!(category_id = %id, "Category updated");
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound`, or `AppError::Conflict` while articles
    /// are filed under the category.
    pub async fn delete(&self, id: CategoryId) -> Result<(), AppError> {
        ensure_deletable(&self.categories, id).await?;
        self.categories.delete(id).await?;

        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    fn input(name: &str) -> CategoryInput {
        CategoryInput {
            name: Some(name.to_string()),
            description: Some("Desk".to_string()),
            is_active: None,
        }
    }

    #[test]
    fn test_active_defaults_to_true() {
        assert!(input("Sport").validate().unwrap().is_active);
    }

    #[test]
    fn test_description_is_required() {
        let err = CategoryInput {
            description: None,
            ..input("Sport")
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "categoryDescription is required"));
    }

    #[tokio::test]
    async fn test_rename_to_own_name_succeeds() {
        let pool = create_memory_pool().await.unwrap();
        let service = CategoryService::new(&pool);
        let sport = service.create(input("Sport")).await.unwrap();
        service.create(input("Politics")).await.unwrap();

        assert!(service.update(sport.id, input("Sport")).await.is_ok());
        let err = service.update(sport.id, input("Politics")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Category name already exists"));
    }

    #[tokio::test]
    async fn test_delete_unreferenced_then_lookup_misses() {
        let pool = create_memory_pool().await.unwrap();
        let service = CategoryService::new(&pool);
        let sport = service.create(input("Sport")).await.unwrap();

        service.delete(sport.id).await.unwrap();
        let err = service.get(sport.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Category not found"));
    }
}
