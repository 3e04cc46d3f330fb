//! Integration tests for Newsdesk.
//!
//! The whole application runs in process: every test gets a fresh in-memory
//! `SQLite` database with migrations applied and drives the router through
//! `tower::ServiceExt::oneshot`. No server or external database is needed.
//!
//! ```bash
//! cargo test -p newsdesk-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

use newsdesk_api::config::{ConfiguredAdmin, JwtConfig};
use newsdesk_api::{ApiConfig, AppState, app, db};
use newsdesk_core::Email;

pub const ADMIN_EMAIL: &str = "admin@newsdesk.org";
pub const ADMIN_PASSWORD: &str = "front-page-42";
pub const STAFF_PASSWORD: &str = "desk-password-1";

const TEST_SECRET: &str = "k7#Qm2$vX9@pL4!wZ8^rT1&yB6*nH3%c";

/// Configuration for an in-process test application.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("sqlite::memory:"),
        db_max_connections: 1,
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        jwt: JwtConfig {
            secret: SecretString::from(TEST_SECRET),
            issuer: "newsdesk".to_string(),
            audience: "newsdesk".to_string(),
            ttl: Duration::days(7),
        },
        admin: ConfiguredAdmin {
            email: Email::parse(ADMIN_EMAIL).unwrap(),
            password: SecretString::from(ADMIN_PASSWORD),
            name: "Administrator".to_string(),
        },
        cors_origins: Vec::new(),
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A running application backed by its own in-memory database.
pub struct TestApp {
    router: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::create_memory_pool().await.unwrap();
        let router = app(AppState::new(test_config(), pool.clone()));
        Self { router, pool }
    }

    /// Send one request and return the status with the decoded JSON body
    /// (`Value::Null` for an empty or non-JSON body).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Sign in and return the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/odata/login",
                None,
                json!({"email": email, "password": password}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Create a persisted account through the admin API and return its ID.
    pub async fn create_account(&self, admin: &str, name: &str, email: &str, role: i32) -> i64 {
        let (status, body) = self
            .post(
                "/odata/systemaccounts",
                Some(admin),
                json!({
                    "accountName": name,
                    "accountEmail": email,
                    "accountRole": role,
                    "accountPassword": STAFF_PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "account create failed: {body}");
        body["data"]["accountId"].as_i64().unwrap()
    }

    /// Create a staff account and sign it in.
    pub async fn staff(&self, admin: &str, email: &str) -> (i64, String) {
        let id = self.create_account(admin, "Desk Editor", email, 1).await;
        let token = self.login(email, STAFF_PASSWORD).await;
        (id, token)
    }

    pub async fn create_category(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/odata/categories",
                Some(token),
                json!({"categoryName": name, "categoryDescription": format!("{name} desk")}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "category create failed: {body}");
        body["data"]["categoryId"].as_i64().unwrap()
    }

    pub async fn create_tag(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .post("/odata/tags", Some(token), json!({"tagName": name}))
            .await;
        assert_eq!(status, StatusCode::CREATED, "tag create failed: {body}");
        body["data"]["tagId"].as_i64().unwrap()
    }

    /// Create an article and return the full `data` payload.
    pub async fn create_article(&self, token: &str, article: Value) -> Value {
        let (status, body) = self
            .post("/odata/newsarticles", Some(token), article)
            .await;
        assert_eq!(status, StatusCode::CREATED, "article create failed: {body}");
        body["data"].clone()
    }
}

/// Sorted tag IDs of an article payload.
#[must_use]
pub fn tag_ids(article: &Value) -> Vec<i64> {
    let mut ids: Vec<i64> = article["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["tagId"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    ids
}
