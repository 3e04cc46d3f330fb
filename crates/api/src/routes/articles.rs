//! News article endpoints.
//!
//! `/newsarticles` is the full editorial view (Staff or Admin);
//! `/publicnewsarticles` serves published articles to anyone.

use std::collections::HashMap;

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use newsdesk_core::ArticleId;

use crate::{
    db::ArticleScope,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::{OptionalAuth, RequireAuth},
    models::{Article, Identity, TagRef},
    query::ListQuery,
    response::{ApiResponse, Collection},
    services::{ArticleInput, ArticleService, Operation, authorize, require},
    state::AppState,
};

use super::listing;

/// Relations that list endpoints only include on `$expand`.
const EXPANDABLE: &[&str] = &["tags"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/newsarticles", get(index).post(create))
        .route("/newsarticles/mine", get(mine))
        .route("/newsarticles/{id}", get(show).put(update).delete(destroy))
        .route("/publicnewsarticles", get(public_index))
        .route("/publicnewsarticles/{id}", get(public_show))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRefView {
    pub tag_id: i32,
    pub tag_name: String,
}

impl From<&TagRef> for TagRefView {
    fn from(tag: &TagRef) -> Self {
        Self {
            tag_id: tag.id.as_i32(),
            tag_name: tag.name.clone(),
        }
    }
}

/// Editorial view of an article.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub news_article_id: i32,
    pub news_title: String,
    pub headline: String,
    pub created_date: DateTime<Utc>,
    pub news_content: Option<String>,
    pub news_source: Option<String>,
    pub news_status: bool,
    pub modified_date: DateTime<Utc>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub created_by_id: Option<i32>,
    pub author_name: Option<String>,
    pub updated_by_id: Option<i32>,
    pub tags: Vec<TagRefView>,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            news_article_id: article.id.as_i32(),
            news_title: article.title.clone(),
            headline: article.headline.clone(),
            created_date: article.created_at,
            news_content: article.content.clone(),
            news_source: article.source.clone(),
            news_status: article.is_published,
            modified_date: article.modified_at,
            category_id: article.category.as_ref().map(|c| c.id.as_i32()),
            category_name: article.category.as_ref().map(|c| c.name.clone()),
            created_by_id: article.author.as_ref().map(|a| a.id.as_i32()),
            author_name: article.author.as_ref().map(|a| a.name.clone()),
            updated_by_id: article.updated_by.map(|id| id.as_i32()),
            tags: article.tags.iter().map(TagRefView::from).collect(),
        }
    }
}

/// Public view: no publication status, no modifier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicArticleView {
    pub news_article_id: i32,
    pub news_title: String,
    pub headline: String,
    pub created_date: DateTime<Utc>,
    pub news_content: Option<String>,
    pub news_source: Option<String>,
    pub modified_date: DateTime<Utc>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub created_by_id: Option<i32>,
    pub author_name: Option<String>,
    pub tags: Vec<TagRefView>,
}

impl From<&Article> for PublicArticleView {
    fn from(article: &Article) -> Self {
        let view = ArticleView::from(article);
        Self {
            news_article_id: view.news_article_id,
            news_title: view.news_title,
            headline: view.headline,
            created_date: view.created_date,
            news_content: view.news_content,
            news_source: view.news_source,
            modified_date: view.modified_date,
            category_id: view.category_id,
            category_name: view.category_name,
            created_by_id: view.created_by_id,
            author_name: view.author_name,
            tags: view.tags,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    pub news_title: Option<String>,
    pub headline: Option<String>,
    pub news_content: Option<String>,
    pub news_source: Option<String>,
    pub category_id: Option<i32>,
    pub news_status: Option<bool>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

impl From<ArticleRequest> for ArticleInput {
    fn from(request: ArticleRequest) -> Self {
        Self {
            title: request.news_title,
            headline: request.headline,
            content: request.news_content,
            source: request.news_source,
            category_id: request.category_id,
            is_published: request.news_status,
            tag_ids: request.tag_ids,
        }
    }
}

async fn list_scope(
    state: &AppState,
    scope: ArticleScope,
    params: &HashMap<String, String>,
) -> Result<ApiResponse<Collection>, AppError> {
    let query = ListQuery::parse(params, EXPANDABLE)?;
    let articles = ArticleService::new(state.pool()).list(scope).await?;
    let views: Vec<ArticleView> = articles.iter().map(ArticleView::from).collect();
    listing(&query, &views, EXPANDABLE)
}

#[instrument(skip_all)]
async fn index(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> Result<ApiResponse<Collection>, AppError> {
    require(&identity, Operation::ManageArticles)?;
    list_scope(&state, ArticleScope::All, &params).await
}

/// Articles authored by the caller. The configured admin authors none.
#[instrument(skip_all)]
async fn mine(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> Result<ApiResponse<Collection>, AppError> {
    require(&identity, Operation::ManageArticles)?;

    let Some(author) = identity.account_id() else {
        let query = ListQuery::parse(&params, EXPANDABLE)?;
        return listing::<ArticleView>(&query, &[], EXPANDABLE);
    };
    list_scope(&state, ArticleScope::AuthoredBy(author), &params).await
}

#[instrument(skip(identity, state))]
async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ArticleId>,
) -> Result<ApiResponse<ArticleView>, AppError> {
    require(&identity, Operation::ManageArticles)?;

    let article = ArticleService::new(state.pool()).get(id).await?;
    Ok(ApiResponse::ok(ArticleView::from(&article)))
}

#[instrument(skip_all)]
async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppJson(request): AppJson<ArticleRequest>,
) -> Result<ApiResponse<ArticleView>, AppError> {
    require(&identity, Operation::ManageArticles)?;

    let article = ArticleService::new(state.pool())
        .create(&identity, request.into())
        .await?;
    Ok(ApiResponse::created(
        "News article created successfully",
        ArticleView::from(&article),
    ))
}

#[instrument(skip(identity, state, request))]
async fn update(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ArticleId>,
    AppJson(request): AppJson<ArticleRequest>,
) -> Result<ApiResponse<ArticleView>, AppError> {
    require(&identity, Operation::ManageArticles)?;

    let article = ArticleService::new(state.pool())
        .update(&identity, id, request.into())
        .await?;
    Ok(ApiResponse::ok_with(
        "News article updated successfully",
        ArticleView::from(&article),
    ))
}

#[instrument(skip(identity, state))]
async fn destroy(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ArticleId>,
) -> Result<ApiResponse<()>, AppError> {
    require(&identity, Operation::ManageArticles)?;

    ArticleService::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::message("News article deleted successfully"))
}

fn allow_public_read(identity: Option<&Identity>) -> Result<(), AppError> {
    authorize(identity.map(Identity::role), Operation::ReadPublishedArticles)?;
    Ok(())
}

#[instrument(skip_all)]
async fn public_index(
    OptionalAuth(identity): OptionalAuth,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> Result<ApiResponse<Collection>, AppError> {
    allow_public_read(identity.as_ref())?;
    let query = ListQuery::parse(&params, EXPANDABLE)?;

    let articles = ArticleService::new(state.pool())
        .list(ArticleScope::Published)
        .await?;
    let views: Vec<PublicArticleView> = articles.iter().map(PublicArticleView::from).collect();
    listing(&query, &views, EXPANDABLE)
}

#[instrument(skip(identity, state))]
async fn public_show(
    OptionalAuth(identity): OptionalAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ArticleId>,
) -> Result<ApiResponse<PublicArticleView>, AppError> {
    allow_public_read(identity.as_ref())?;

    let article = ArticleService::new(state.pool()).get_published(id).await?;
    Ok(ApiResponse::ok(PublicArticleView::from(&article)))
}
