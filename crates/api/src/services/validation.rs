//! Validation and invariant checks that run before any mutation.
//!
//! Each guarded entity (account, category, tag) exposes the same two checks:
//! whether a unique value is already taken by another row, and whether a row
//! is free of article references. The helpers turn a failed check into the
//! matching `AppError` so services can use `?`.
//!
//! The unique indexes and foreign keys in the schema back these checks up; a
//! race between check and write still ends as `Conflict`.

use std::fmt::Display;
use std::future::Future;

use newsdesk_core::{AccountId, CategoryId, TagId};

use crate::db::{AccountRepository, CategoryRepository, RepositoryError, TagRepository};
use crate::error::AppError;

/// An entity with a unique value and article-based deletability.
pub trait Guarded {
    type Id: Copy + Display + Send + Sync;

    /// Entity label used in messages, e.g. `"Category"`.
    const ENTITY: &'static str;
    /// Message reported when the unique value is taken.
    const DUPLICATE: &'static str;
    /// Message reported when the row is still referenced.
    const IN_USE: &'static str;

    /// True if a row other than `exclude` holds exactly `value`.
    fn unique_value_exists(
        &self,
        value: &str,
        exclude: Option<Self::Id>,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// True iff no article references the row.
    fn can_delete(&self, id: Self::Id) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// True if the row exists.
    fn exists(&self, id: Self::Id) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// `NotFound` message for an entity, e.g. `"Tag not found"`.
#[must_use]
pub fn not_found<G: Guarded>() -> AppError {
    AppError::NotFound(format!("{} not found", G::ENTITY))
}

/// Fail with `Conflict` if `value` is taken by a row other than `exclude`.
///
/// # Errors
///
/// Returns `AppError::Conflict` on a duplicate, or `AppError::Database` if the
/// lookup fails.
pub async fn ensure_unique<G: Guarded + Sync>(
    repo: &G,
    value: &str,
    exclude: Option<G::Id>,
) -> Result<(), AppError> {
    if repo.unique_value_exists(value, exclude).await? {
        return Err(AppError::Conflict(G::DUPLICATE.to_string()));
    }
    Ok(())
}

/// Fail with `NotFound` if the row is absent.
///
/// # Errors
///
/// Returns `AppError::NotFound` or `AppError::Database`.
pub async fn ensure_exists<G: Guarded + Sync>(repo: &G, id: G::Id) -> Result<(), AppError> {
    if repo.exists(id).await? {
        Ok(())
    } else {
        Err(not_found::<G>())
    }
}

/// Fail with `NotFound` if the row is absent, or `Conflict` if it is referenced.
///
/// # Errors
///
/// Returns `AppError::NotFound`, `AppError::Conflict` or `AppError::Database`.
pub async fn ensure_deletable<G: Guarded + Sync>(repo: &G, id: G::Id) -> Result<(), AppError> {
    ensure_exists(repo, id).await?;
    if !repo.can_delete(id).await? {
        tracing::info!(entity = G::ENTITY, id = %id, "Delete blocked by article references");
        return Err(AppError::Conflict(G::IN_USE.to_string()));
    }
    Ok(())
}

impl Guarded for AccountRepository<'_> {
    type Id = AccountId;

    const ENTITY: &'static str = "Account";
    const DUPLICATE: &'static str = "Email already exists";
    const IN_USE: &'static str = "Cannot delete an account that has news articles";

    async fn unique_value_exists(
        &self,
        value: &str,
        exclude: Option<AccountId>,
    ) -> Result<bool, RepositoryError> {
        self.email_exists(value, exclude).await
    }

    async fn can_delete(&self, id: AccountId) -> Result<bool, RepositoryError> {
        Ok(!self.has_articles(id).await?)
    }

    async fn exists(&self, id: AccountId) -> Result<bool, RepositoryError> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}

impl Guarded for CategoryRepository<'_> {
    type Id = CategoryId;

    const ENTITY: &'static str = "Category";
    const DUPLICATE: &'static str = "Category name already exists";
    const IN_USE: &'static str = "Cannot delete a category that has news articles";

    async fn unique_value_exists(
        &self,
        value: &str,
        exclude: Option<CategoryId>,
    ) -> Result<bool, RepositoryError> {
        self.name_exists(value, exclude).await
    }

    async fn can_delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        Ok(!self.has_articles(id).await?)
    }

    async fn exists(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}

impl Guarded for TagRepository<'_> {
    type Id = TagId;

    const ENTITY: &'static str = "Tag";
    const DUPLICATE: &'static str = "Tag name already exists";
    const IN_USE: &'static str = "Cannot delete a tag that is used by news articles";

    async fn unique_value_exists(
        &self,
        value: &str,
        exclude: Option<TagId>,
    ) -> Result<bool, RepositoryError> {
        self.name_exists(value, exclude).await
    }

    async fn can_delete(&self, id: TagId) -> Result<bool, RepositoryError> {
        Ok(!self.has_articles(id).await?)
    }

    async fn exists(&self, id: TagId) -> Result<bool, RepositoryError> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}

// =============================================================================
// Request Field Validation
// =============================================================================

/// Collects field-level violations and reports them as one `BadRequest`.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The field must be present and not blank.
    pub fn required(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if value.is_none_or(|v| v.trim().is_empty()) {
            self.0.push(format!("{field} is required"));
        }
        self
    }

    /// The field, when present, must not exceed `max` characters.
    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.0.push(format!("{field} must be at most {max} characters"));
        }
        self
    }

    /// Record a free-form violation.
    pub fn push(&mut self, message: impl Into<String>) -> &mut Self {
        self.0.push(message.into());
        self
    }

    /// `Ok` when nothing was recorded; otherwise all messages joined with `"; "`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` listing every violation.
    pub fn finish(&self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::BadRequest(self.0.join("; ")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::models::{CategoryDraft, TagDraft};

    #[tokio::test]
    async fn test_ensure_unique_excludes_self() {
        let pool = create_memory_pool().await.unwrap();
        let repo = CategoryRepository::new(&pool);
        let world = repo
            .create(&CategoryDraft {
                name: "World".to_string(),
                description: "Foreign desk".to_string(),
                is_active: true,
            })
            .await
            .unwrap();

        assert!(ensure_unique(&repo, "World", Some(world.id)).await.is_ok());
        let err = ensure_unique(&repo, "World", None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Category name already exists"));
    }

    #[tokio::test]
    async fn test_ensure_deletable_distinguishes_missing_rows() {
        let pool = create_memory_pool().await.unwrap();
        let repo = TagRepository::new(&pool);

        let err = ensure_deletable(&repo, TagId::new(404)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Tag not found"));

        let tag = repo
            .create(&TagDraft {
                name: "elections".to_string(),
                note: None,
            })
            .await
            .unwrap();
        assert!(ensure_deletable(&repo, tag.id).await.is_ok());
    }

    #[test]
    fn test_violations_join_messages() {
        let mut violations = Violations::new();
        violations
            .required("tagName", Some("  "))
            .max_len("note", Some(&"x".repeat(401)), 400);

        let err = violations.finish().unwrap_err();
        assert!(matches!(
            err,
            AppError::BadRequest(msg)
                if msg == "tagName is required; note must be at most 400 characters"
        ));
    }

    #[test]
    fn test_violations_empty_is_ok() {
        let mut violations = Violations::new();
        violations.required("tagName", Some("sport"));
        assert!(violations.finish().is_ok());
    }
}
