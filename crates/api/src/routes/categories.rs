//! Category endpoints (Staff or Admin).

use std::collections::HashMap;

use axum::{Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use newsdesk_core::CategoryId;

use crate::{
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::RequireAuth,
    models::Category,
    query::ListQuery,
    response::{ApiResponse, Collection},
    services::{CategoryInput, CategoryService, Operation, require},
    state::AppState,
};

use super::listing;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/{id}", get(show).put(update).delete(destroy))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub category_id: i32,
    pub category_name: String,
    pub category_description: String,
    pub is_active: bool,
    pub deletable: bool,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            category_id: category.id.as_i32(),
            category_name: category.name.clone(),
            category_description: category.description.clone(),
            is_active: category.is_active,
            deletable: category.is_deletable(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub category_name: Option<String>,
    pub category_description: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(request: CategoryRequest) -> Self {
        Self {
            name: request.category_name,
            description: request.category_description,
            is_active: request.is_active,
        }
    }
}

#[instrument(skip_all)]
async fn index(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> Result<ApiResponse<Collection>, AppError> {
    require(&identity, Operation::ManageCategories)?;
    let query = ListQuery::parse(&params, &[])?;

    let categories = CategoryService::new(state.pool()).list().await?;
    let views: Vec<CategoryView> = categories.iter().map(CategoryView::from).collect();
    listing(&query, &views, &[])
}

async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<CategoryId>,
) -> Result<ApiResponse<CategoryView>, AppError> {
    require(&identity, Operation::ManageCategories)?;

    let category = CategoryService::new(state.pool()).get(id).await?;
    Ok(ApiResponse::ok(CategoryView::from(&category)))
}

#[instrument(skip_all)]
async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppJson(request): AppJson<CategoryRequest>,
) -> Result<ApiResponse<CategoryView>, AppError> {
    require(&identity, Operation::ManageCategories)?;

    let category = CategoryService::new(state.pool())
        .create(request.into())
        .await?;
    Ok(ApiResponse::created(
        "Category created successfully",
        CategoryView::from(&category),
    ))
}

#[instrument(skip(identity, state, request))]
async fn update(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<CategoryId>,
    AppJson(request): AppJson<CategoryRequest>,
) -> Result<ApiResponse<CategoryView>, AppError> {
    require(&identity, Operation::ManageCategories)?;

    let category = CategoryService::new(state.pool())
        .update(id, request.into())
        .await?;
    Ok(ApiResponse::ok_with(
        "Category updated successfully",
        CategoryView::from(&category),
    ))
}

#[instrument(skip(identity, state))]
async fn destroy(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<CategoryId>,
) -> Result<ApiResponse<()>, AppError> {
    require(&identity, Operation::ManageCategories)?;

    CategoryService::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::message("Category deleted successfully"))
}
