//! Sign-in endpoint.

use axum::{Router, extract::State, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::AppError,
    extract::AppJson,
    response::ApiResponse,
    services::{AuthService, LoginOutcome},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        // Path used by older clients.
        .route("/systemaccounts/login", post(login))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "accountEmail")]
    pub email: String,
    #[serde(alias = "accountPassword")]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub account_id: i32,
    pub account_name: String,
    pub account_email: String,
    pub account_role: i32,
    pub role_name: &'static str,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<LoginOutcome> for LoginView {
    fn from(outcome: LoginOutcome) -> Self {
        let LoginOutcome { profile, token } = outcome;
        Self {
            account_id: profile.account_id,
            account_name: profile.name,
            account_email: profile.email.to_string(),
            account_role: profile.role.code(),
            role_name: profile.role.display_name(),
            token: token.token,
            expires_at: token.expires_at,
        }
    }
}

#[instrument(skip_all, fields(email = %request.email))]
async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<ApiResponse<LoginView>, AppError> {
    let config = state.config();
    let outcome = AuthService::new(state.pool(), state.tokens(), &config.admin)
        .login(&request.email, &request.password)
        .await?;

    Ok(ApiResponse::ok_with("Login successful", LoginView::from(outcome)))
}
