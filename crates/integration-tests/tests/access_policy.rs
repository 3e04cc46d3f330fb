//! Role-based access across the route table.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use newsdesk_api::error::FORBIDDEN_MESSAGE;
use newsdesk_integration_tests::TestApp;

#[tokio::test]
async fn test_staff_cannot_manage_accounts() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (id, staff) = app.staff(&admin, "desk@newsdesk.org").await;

    let (status, body) = app.get("/odata/systemaccounts", Some(&staff)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], FORBIDDEN_MESSAGE);

    let (status, _) = app
        .delete(&format!("/odata/systemaccounts/{id}"), Some(&staff))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_staff_manages_catalog_and_reads_statistics() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (_, staff) = app.staff(&admin, "desk@newsdesk.org").await;

    let (status, _) = app
        .post(
            "/odata/categories",
            Some(&staff),
            json!({"categoryName": "Sport", "categoryDescription": "Sport desk"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post("/odata/tags", Some(&staff), json!({"tagName": "football"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.get("/odata/newsstatistics", Some(&staff)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_other_roles_only_get_self_service() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    for (role, email) in [(0, "viewer@newsdesk.org"), (2, "lecturer@newsdesk.org")] {
        app.create_account(&admin, "Reader", email, role).await;
        let token = app
            .login(email, newsdesk_integration_tests::STAFF_PASSWORD)
            .await;

        for uri in [
            "/odata/categories",
            "/odata/tags",
            "/odata/newsarticles",
            "/odata/newsstatistics",
            "/odata/systemaccounts",
        ] {
            let (status, _) = app.get(uri, Some(&token)).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "role {role} on {uri}");
        }

        let (status, body) = app.get("/odata/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["accountRole"], role);

        let (status, _) = app.get("/odata/publicnewsarticles", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_anonymous_access() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/odata/publicnewsarticles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], json!([]));

    for uri in ["/odata/newsarticles", "/odata/me", "/odata/newsstatistics"] {
        let (status, _) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_unknown_route_gets_not_found_envelope() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/odata/nothing-here", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}
