//! Tag endpoints (Staff or Admin).

use std::collections::HashMap;

use axum::{Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use newsdesk_core::TagId;

use crate::{
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::RequireAuth,
    models::Tag,
    query::ListQuery,
    response::{ApiResponse, Collection},
    services::{Operation, TagInput, TagService, require},
    state::AppState,
};

use super::listing;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(index).post(create))
        .route("/tags/{id}", get(show).put(update).delete(destroy))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagView {
    pub tag_id: i32,
    pub tag_name: String,
    pub note: Option<String>,
    pub deletable: bool,
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        Self {
            tag_id: tag.id.as_i32(),
            tag_name: tag.name.clone(),
            note: tag.note.clone(),
            deletable: tag.is_deletable(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRequest {
    pub tag_name: Option<String>,
    pub note: Option<String>,
}

impl From<TagRequest> for TagInput {
    fn from(request: TagRequest) -> Self {
        Self {
            name: request.tag_name,
            note: request.note,
        }
    }
}

#[instrument(skip_all)]
async fn index(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> Result<ApiResponse<Collection>, AppError> {
    require(&identity, Operation::ManageTags)?;
    let query = ListQuery::parse(&params, &[])?;

    let tags = TagService::new(state.pool()).list().await?;
    let views: Vec<TagView> = tags.iter().map(TagView::from).collect();
    listing(&query, &views, &[])
}

async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<TagId>,
) -> Result<ApiResponse<TagView>, AppError> {
    require(&identity, Operation::ManageTags)?;

    let tag = TagService::new(state.pool()).get(id).await?;
    Ok(ApiResponse::ok(TagView::from(&tag)))
}

#[instrument(skip_all)]
async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppJson(request): AppJson<TagRequest>,
) -> Result<ApiResponse<TagView>, AppError> {
    require(&identity, Operation::ManageTags)?;

    let tag = TagService::new(state.pool()).create(request.into()).await?;
    Ok(ApiResponse::created("Tag created successfully", TagView::from(&tag)))
}

#[instrument(skip(identity, state, request))]
async fn update(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<TagId>,
    AppJson(request): AppJson<TagRequest>,
) -> Result<ApiResponse<TagView>, AppError> {
    require(&identity, Operation::ManageTags)?;

    let tag = TagService::new(state.pool())
        .update(id, request.into())
        .await?;
    Ok(ApiResponse::ok_with("Tag updated successfully", TagView::from(&tag)))
}

#[instrument(skip(identity, state))]
async fn destroy(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<TagId>,
) -> Result<ApiResponse<()>, AppError> {
    require(&identity, Operation::ManageTags)?;

    TagService::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::message("Tag deleted successfully"))
}
