//! Account administration endpoints (Admin only).

use std::collections::HashMap;

use axum::{Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use newsdesk_core::AccountId;

use crate::{
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::RequireAuth,
    models::Account,
    query::ListQuery,
    response::{ApiResponse, Collection},
    services::{AccountInput, AccountService, Operation, require},
    state::AppState,
};

use super::listing;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/systemaccounts", get(index).post(create))
        .route("/systemaccounts/{id}", get(show).put(update).delete(destroy))
}

/// Account as returned to clients. The password hash never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub account_id: i32,
    pub account_name: String,
    pub account_email: String,
    pub account_role: i32,
    pub role_name: &'static str,
    pub deletable: bool,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id.as_i32(),
            account_name: account.name.clone(),
            account_email: account.email.to_string(),
            account_role: account.role.code(),
            role_name: account.role.display_name(),
            deletable: account.is_deletable(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub account_name: Option<String>,
    pub account_email: Option<String>,
    pub account_role: Option<i32>,
    pub account_password: Option<String>,
}

impl From<AccountRequest> for AccountInput {
    fn from(request: AccountRequest) -> Self {
        Self {
            name: request.account_name,
            email: request.account_email,
            role: request.account_role,
            password: request.account_password,
        }
    }
}

#[instrument(skip_all)]
async fn index(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> Result<ApiResponse<Collection>, AppError> {
    require(&identity, Operation::ManageAccounts)?;
    let query = ListQuery::parse(&params, &[])?;

    let accounts = AccountService::new(state.pool()).list().await?;
    let views: Vec<AccountView> = accounts.iter().map(AccountView::from).collect();
    listing(&query, &views, &[])
}

#[instrument(skip(identity, state))]
async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<AccountId>,
) -> Result<ApiResponse<AccountView>, AppError> {
    require(&identity, Operation::ManageAccounts)?;

    let account = AccountService::new(state.pool()).get(id).await?;
    Ok(ApiResponse::ok(AccountView::from(&account)))
}

#[instrument(skip_all)]
async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppJson(request): AppJson<AccountRequest>,
) -> Result<ApiResponse<AccountView>, AppError> {
    require(&identity, Operation::ManageAccounts)?;

    let account = AccountService::new(state.pool()).create(request.into()).await?;
    Ok(ApiResponse::created(
        "Account created successfully",
        AccountView::from(&account),
    ))
}

#[instrument(skip(identity, state, request))]
async fn update(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<AccountId>,
    AppJson(request): AppJson<AccountRequest>,
) -> Result<ApiResponse<AccountView>, AppError> {
    require(&identity, Operation::ManageAccounts)?;

    let account = AccountService::new(state.pool())
        .update(id, request.into())
        .await?;
    Ok(ApiResponse::ok_with(
        "Account updated successfully",
        AccountView::from(&account),
    ))
}

#[instrument(skip(identity, state))]
async fn destroy(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<AccountId>,
) -> Result<ApiResponse<()>, AppError> {
    require(&identity, Operation::ManageAccounts)?;

    AccountService::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::message("Account deleted successfully"))
}
