//! Tag management.

use sqlx::SqlitePool;

use newsdesk_core::TagId;

use crate::db::TagRepository;
use crate::error::AppError;
use crate::models::{Tag, TagDraft};
use crate::services::validation::{Violations, ensure_deletable, ensure_unique, not_found};

const MAX_NAME_LENGTH: usize = 50;
const MAX_NOTE_LENGTH: usize = 400;

/// Raw tag fields from a request.
#[derive(Debug, Clone, Default)]
pub struct TagInput {
    pub name: Option<String>,
    pub note: Option<String>,
}

impl TagInput {
    fn validate(self) -> Result<TagDraft, AppError> {
        let mut violations = Violations::new();
        violations
            .required("tagName", self.name.as_deref())
            .max_len("tagName", self.name.as_deref(), MAX_NAME_LENGTH)
            .max_len("note", self.note.as_deref(), MAX_NOTE_LENGTH);
        violations.finish()?;

        Ok(TagDraft {
            name: self.name.unwrap_or_default().trim().to_string(),
            note: self.note.filter(|n| !n.trim().is_empty()),
        })
    }
}

pub struct TagService<'a> {
    tags: TagRepository<'a>,
}

impl<'a> TagService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            tags: TagRepository::new(pool),
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the read fails.
    pub async fn list(&self) -> Result<Vec<Tag>, AppError> {
        Ok(self.tags.list_all().await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the tag does not exist.
    pub async fn get(&self, id: TagId) -> Result<Tag, AppError> {
        self.tags
            .get_by_id(id)
            .await?
            .ok_or_else(not_found::<TagRepository<'_>>)
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` or `AppError::Conflict` (name taken).
    pub async fn create(&self, input: TagInput) -> Result<Tag, AppError> {
        let draft = input.validate()?;
        ensure_unique(&self.tags, &draft.name, None).await?;

        let tag = self.tags.create(&draft).await?;
        tracing::info!(tag_id = %tag.id, "Tag created");
        Ok(tag)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound`, `AppError::BadRequest` or
    /// `AppError::Conflict` (name taken by another tag).
    pub async fn update(&self, id: TagId, input: TagInput) -> Result<Tag, AppError> {
        self.get(id).await?;
        let draft = input.validate()?;
        ensure_unique(&self.tags, &draft.name, Some(id)).await?;

        let tag = self.tags.update(id, &draft).await?;
        tracing::info!(tag_id = %id, "Tag updated");
        Ok(tag)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound`, or `AppError::Conflict` while any article
    /// carries the tag.
    pub async fn delete(&self, id: TagId) -> Result<(), AppError> {
        ensure_deletable(&self.tags, id).await?;
        self.tags.delete(id).await?;

        tracing::info!(tag_id = %id, "Tag deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_note_becomes_none() {
        let draft = TagInput {
            name: Some(" weather ".to_string()),
            note: Some("  ".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(draft.name, "weather");
        assert_eq!(draft.note, None);
    }

    #[test]
    fn test_name_length_limit() {
        let err = TagInput {
            name: Some("x".repeat(51)),
            note: None,
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "tagName must be at most 50 characters"));
    }
}
