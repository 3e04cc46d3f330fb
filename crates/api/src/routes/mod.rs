//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Liveness
//! GET    /health/ready                   - Readiness (database ping)
//!
//! # Auth
//! POST   /odata/login                    - Sign in, returns a bearer token
//! POST   /odata/systemaccounts/login     - Same, older path
//!
//! # Accounts (Admin)
//! GET    /odata/systemaccounts           - List
//! POST   /odata/systemaccounts           - Create
//! GET    /odata/systemaccounts/{id}      - Show
//! PUT    /odata/systemaccounts/{id}      - Update
//! DELETE /odata/systemaccounts/{id}      - Delete (no authored articles)
//!
//! # Categories, Tags (Staff or Admin)
//! GET|POST /odata/categories, GET|PUT|DELETE /odata/categories/{id}
//! GET|POST /odata/tags,       GET|PUT|DELETE /odata/tags/{id}
//!
//! # Articles
//! GET|POST /odata/newsarticles, GET|PUT|DELETE /odata/newsarticles/{id}
//! GET    /odata/newsarticles/mine        - Caller's own articles
//! GET    /odata/publicnewsarticles       - Published only, anonymous
//! GET    /odata/publicnewsarticles/{id}
//! GET    /odata/newsstatistics           - ?startDate=&endDate=
//!
//! # Self-service
//! GET    /odata/me
//! PATCH  /odata/me/info
//! PATCH  /odata/me/password
//! ```

pub mod accounts;
pub mod articles;
pub mod auth;
pub mod categories;
pub mod health;
pub mod profile;
pub mod statistics;
pub mod tags;

use std::any::Any;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::{
    error::AppError,
    query::ListQuery,
    response::{ApiResponse, Collection},
    state::AppState,
};

/// All routes, without state or layers.
pub fn routes() -> Router<AppState> {
    let odata = Router::new()
        .merge(auth::router())
        .merge(accounts::router())
        .merge(categories::router())
        .merge(tags::router())
        .merge(articles::router())
        .merge(statistics::router())
        .merge(profile::router());

    Router::new()
        .merge(health::router())
        .nest("/odata", odata)
        .fallback(not_found)
}

/// The complete application: routes, tracing, CORS and panic recovery.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    routes()
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                    let status = response.status();
                    span.record("status", status.as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    if status.is_server_error() {
                        tracing::error!(%status, "Request failed");
                    } else if status.is_client_error() {
                        tracing::warn!(%status, "Request rejected");
                    } else {
                        tracing::info!(%status, "Request completed");
                    }
                }),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        return layer.allow_origin(AnyOrigin);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}

/// Apply list query options to the serialized views and wrap the result.
pub(crate) fn listing<T: Serialize>(
    query: &ListQuery,
    views: &[T],
    expandable: &[&str],
) -> Result<ApiResponse<Collection>, AppError> {
    let rows = views
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(format!("failed to serialize rows: {e}")))?;

    Ok(ApiResponse::ok(query.apply(rows, expandable)))
}
