//! Article authoring.
//!
//! Creating or updating an article writes the row and reconciles its tags in
//! one transaction; the article is read back after commit.

use chrono::Utc;
use sqlx::SqlitePool;

use newsdesk_core::{ArticleId, CategoryId, TagId};

use crate::db::{ArticleRepository, ArticleScope, CategoryRepository, RepositoryError, articles};
use crate::error::AppError;
use crate::models::{Article, ArticleDraft, Identity};
use crate::services::tag_sync::sync_article_tags;
use crate::services::validation::{Guarded, Violations};

const MAX_TITLE_LENGTH: usize = 400;
const MAX_HEADLINE_LENGTH: usize = 150;
const MAX_SOURCE_LENGTH: usize = 400;

/// Raw article fields from a request.
#[derive(Debug, Clone, Default)]
pub struct ArticleInput {
    pub title: Option<String>,
    pub headline: Option<String>,
    pub content: Option<String>,
    pub source: Option<String>,
    pub category_id: Option<i32>,
    pub is_published: Option<bool>,
    pub tag_ids: Vec<i32>,
}

impl ArticleInput {
    fn validate(self) -> Result<(ArticleDraft, Vec<TagId>), AppError> {
        let mut violations = Violations::new();
        violations
            .max_len("newsTitle", self.title.as_deref(), MAX_TITLE_LENGTH)
            .required("headline", self.headline.as_deref())
            .max_len("headline", self.headline.as_deref(), MAX_HEADLINE_LENGTH)
            .max_len("newsSource", self.source.as_deref(), MAX_SOURCE_LENGTH);
        violations.finish()?;

        let draft = ArticleDraft {
            title: self.title.unwrap_or_default().trim().to_string(),
            headline: self.headline.unwrap_or_default().trim().to_string(),
            content: self.content.filter(|c| !c.trim().is_empty()),
            source: self.source.filter(|s| !s.trim().is_empty()),
            category_id: self.category_id.map(CategoryId::new),
            is_published: self.is_published.unwrap_or(true),
        };
        let tags = self.tag_ids.into_iter().map(TagId::new).collect();
        Ok((draft, tags))
    }
}

pub struct ArticleService<'a> {
    pool: &'a SqlitePool,
    articles: ArticleRepository<'a>,
}

impl<'a> ArticleService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            articles: ArticleRepository::new(pool),
        }
    }

    /// Articles visible in `scope`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the read fails.
    pub async fn list(&self, scope: ArticleScope) -> Result<Vec<Article>, AppError> {
        Ok(self.articles.list(scope).await?)
    }

    /// Any article, published or not.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if it does not exist.
    pub async fn get(&self, id: ArticleId) -> Result<Article, AppError> {
        self.articles
            .get_by_id(id)
            .await?
            .ok_or_else(article_not_found)
    }

    /// A published article. Unpublished articles are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if it does not exist or is unpublished.
    pub async fn get_published(&self, id: ArticleId) -> Result<Article, AppError> {
        self.articles
            .get_by_id(id)
            .await?
            .filter(|article| article.is_published)
            .ok_or_else(article_not_found)
    }

    /// Create an article authored by `identity`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for invalid input or an unknown category.
    pub async fn create(&self, identity: &Identity, input: ArticleInput) -> Result<Article, AppError> {
        let (draft, tags) = input.validate()?;
        self.ensure_category(draft.category_id).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let id = articles::insert(&mut tx, &draft, identity.account_id(), Utc::now())
            .await
            .map_err(category_conflict)?;
        sync_article_tags(&mut tx, id, &tags).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(article_id = %id, "Article created");
        self.get(id).await
    }

    /// Overwrite an article's fields and replace its tags. The author is kept;
    /// `identity` becomes the last modifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the article does not exist, or
    /// `AppError::BadRequest` for invalid input or an unknown category.
    pub async fn update(
        &self,
        identity: &Identity,
        id: ArticleId,
        input: ArticleInput,
    ) -> Result<Article, AppError> {
        let (draft, tags) = input.validate()?;
        self.ensure_category(draft.category_id).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        articles::update(&mut tx, id, &draft, identity.account_id(), Utc::now())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => article_not_found(),
                other => category_conflict(other),
            })?;
        sync_article_tags(&mut tx, id, &tags).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(article_id = %id, "Article updated");
        self.get(id).await
    }

    /// Delete an article and its tag associations.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if it does not exist.
    pub async fn delete(&self, id: ArticleId) -> Result<(), AppError> {
        self.articles.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => article_not_found(),
            other => other.into(),
        })?;

        tracing::info!(article_id = %id, "Article deleted");
        Ok(())
    }

    async fn ensure_category(&self, category: Option<CategoryId>) -> Result<(), AppError> {
        let Some(category) = category else {
            return Ok(());
        };
        if CategoryRepository::new(self.pool).exists(category).await? {
            Ok(())
        } else {
            Err(AppError::BadRequest("Category not found".to_string()))
        }
    }
}

fn article_not_found() -> AppError {
    AppError::NotFound("News article not found".to_string())
}

/// A dangling category reference that slipped past `ensure_category`.
fn category_conflict(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::Conflict(message) => AppError::BadRequest(message),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use newsdesk_core::{AccountId, AccountRole, Email};

    use crate::db::{TagRepository, create_memory_pool};
    use crate::models::TagDraft;

    fn admin() -> Identity {
        Identity::ConfiguredAdmin {
            email: Email::parse("admin@newsdesk.org").unwrap(),
        }
    }

    fn input(tags: &[i32]) -> ArticleInput {
        ArticleInput {
            title: Some("Flood warning".to_string()),
            headline: Some("River levels rising".to_string()),
            tag_ids: tags.to_vec(),
            ..ArticleInput::default()
        }
    }

    async fn seed_tags(pool: &SqlitePool, names: &[&str]) {
        let repo = TagRepository::new(pool);
        for name in names {
            repo.create(&TagDraft {
                name: (*name).to_string(),
                note: None,
            })
            .await
            .unwrap();
        }
    }

    #[test]
    fn test_headline_is_required() {
        let err = ArticleInput::default().validate().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "headline is required"));
    }

    #[test]
    fn test_status_defaults_to_published() {
        let (draft, _) = input(&[]).validate().unwrap();
        assert!(draft.is_published);
    }

    #[tokio::test]
    async fn test_create_drops_unknown_tags_and_update_replaces() {
        let pool = create_memory_pool().await.unwrap();
        seed_tags(&pool, &["weather", "local", "rivers"]).await;
        let service = ArticleService::new(&pool);

        let created = service.create(&admin(), input(&[1, 2, 2, 999])).await.unwrap();
        assert_eq!(created.tag_ids(), vec![TagId::new(1), TagId::new(2)]);

        let updated = service
            .update(&admin(), created.id, input(&[2, 3]))
            .await
            .unwrap();
        assert_eq!(updated.tag_ids(), vec![TagId::new(2), TagId::new(3)]);
    }

    #[tokio::test]
    async fn test_configured_admin_articles_have_no_author() {
        let pool = create_memory_pool().await.unwrap();
        let service = ArticleService::new(&pool);

        let article = service.create(&admin(), input(&[])).await.unwrap();
        assert!(article.author.is_none());
        assert!(article.updated_by.is_none());
    }

    #[tokio::test]
    async fn test_unknown_category_is_bad_request() {
        let pool = create_memory_pool().await.unwrap();
        let service = ArticleService::new(&pool);

        let err = service
            .create(
                &admin(),
                ArticleInput {
                    category_id: Some(42),
                    ..input(&[])
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Category not found"));
    }

    #[tokio::test]
    async fn test_unpublished_article_is_hidden_from_public_read() {
        let pool = create_memory_pool().await.unwrap();
        let service = ArticleService::new(&pool);
        let draft = service
            .create(
                &admin(),
                ArticleInput {
                    is_published: Some(false),
                    ..input(&[])
                },
            )
            .await
            .unwrap();

        assert!(service.get(draft.id).await.is_ok());
        assert!(matches!(
            service.get_published(draft.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_article() {
        let pool = create_memory_pool().await.unwrap();
        let service = ArticleService::new(&pool);
        let staff = Identity::Account {
            id: AccountId::new(1),
            email: Email::parse("staff@newsdesk.org").unwrap(),
            role: AccountRole::Staff,
        };

        let err = service
            .update(&staff, ArticleId::new(9), input(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "News article not found"));
    }

    async fn staff_author(pool: &SqlitePool) -> Identity {
        let account = crate::services::AccountService::new(pool)
            .create(crate::services::AccountInput {
                name: Some("Desk Editor".to_string()),
                email: Some("desk@newsdesk.org".to_string()),
                role: Some(AccountRole::Staff.code()),
                password: Some("desk-password-1".to_string()),
            })
            .await
            .unwrap();
        Identity::Account {
            id: account.id,
            email: account.email,
            role: account.role,
        }
    }

    /// Row write and tag sync, then a failing statement before commit.
    async fn rewrite_then_fail(pool: &SqlitePool, id: ArticleId) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        let rewritten = ArticleDraft {
            title: "Rewritten".to_string(),
            headline: "Half done".to_string(),
            content: None,
            source: None,
            category_id: None,
            is_published: false,
        };
        articles::update(&mut tx, id, &rewritten, None, Utc::now()).await?;
        sync_article_tags(&mut tx, id, &[TagId::new(3)]).await?;

        let dangling = ArticleDraft {
            category_id: Some(CategoryId::new(404)),
            ..rewritten
        };
        articles::update(&mut tx, id, &dangling, None, Utc::now()).await?;
        tx.commit().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_write_leaves_article_untouched() {
        let pool = create_memory_pool().await.unwrap();
        seed_tags(&pool, &["weather", "local", "rivers"]).await;
        let staff = staff_author(&pool).await;
        let service = ArticleService::new(&pool);
        let original = service.create(&staff, input(&[1, 2])).await.unwrap();

        let err = rewrite_then_fail(&pool, original.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let stored = ArticleRepository::new(&pool)
            .get_by_id(original.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Flood warning");
        assert_eq!(stored.updated_by, staff.account_id());
        assert!(stored.is_published);
        assert_eq!(stored.tag_ids(), vec![TagId::new(1), TagId::new(2)]);
    }

    #[tokio::test]
    async fn test_uncommitted_write_is_rolled_back() {
        let pool = create_memory_pool().await.unwrap();
        seed_tags(&pool, &["weather", "local", "rivers"]).await;
        let service = ArticleService::new(&pool);
        let original = service.create(&admin(), input(&[])).await.unwrap();

        {
            let mut tx = pool.begin().await.unwrap();
            let (draft, _) = input(&[]).validate().unwrap();
            articles::update(
                &mut tx,
                original.id,
                &ArticleDraft {
                    title: "Never committed".to_string(),
                    ..draft
                },
                None,
                Utc::now(),
            )
            .await
            .unwrap();
            sync_article_tags(&mut tx, original.id, &[TagId::new(1), TagId::new(3)])
                .await
                .unwrap();
        }

        let stored = service.get(original.id).await.unwrap();
        assert_eq!(stored.title, "Flood warning");
        assert!(stored.tag_ids().is_empty());
        assert_eq!(stored.modified_at, original.modified_at);
    }
}
