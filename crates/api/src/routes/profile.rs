//! Self-service endpoints for the signed-in caller.

use axum::{
    Router,
    extract::State,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::AppError,
    extract::AppJson,
    middleware::RequireAuth,
    response::ApiResponse,
    services::{Operation, Profile, ProfileService, require},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(show))
        .route("/me/info", patch(update_info))
        .route("/me/password", patch(change_password))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub account_id: i32,
    pub account_name: String,
    pub account_email: String,
    pub account_role: i32,
    pub role_name: &'static str,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        Self {
            account_id: profile.account_id,
            account_name: profile.name,
            account_email: profile.email.to_string(),
            account_role: profile.role.code(),
            role_name: profile.role.display_name(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfoRequest {
    pub account_name: Option<String>,
    pub account_email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[instrument(skip_all)]
async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<ProfileView>, AppError> {
    require(&identity, Operation::SelfService)?;

    let profile = ProfileService::new(state.pool(), &state.config().admin)
        .get(&identity)
        .await?;
    Ok(ApiResponse::ok(ProfileView::from(profile)))
}

#[instrument(skip_all)]
async fn update_info(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateInfoRequest>,
) -> Result<ApiResponse<ProfileView>, AppError> {
    require(&identity, Operation::SelfService)?;

    let profile = ProfileService::new(state.pool(), &state.config().admin)
        .update_info(
            &identity,
            request.account_name.as_deref(),
            request.account_email.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok_with(
        "Profile updated successfully",
        ProfileView::from(profile),
    ))
}

#[instrument(skip_all)]
async fn change_password(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    require(&identity, Operation::SelfService)?;

    ProfileService::new(state.pool(), &state.config().admin)
        .change_password(&identity, &request.current_password, &request.new_password)
        .await?;
    Ok(ApiResponse::message("Password changed successfully"))
}
