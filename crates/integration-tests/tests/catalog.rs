//! Uniqueness and deletability rules for accounts, categories and tags.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use newsdesk_integration_tests::TestApp;

#[tokio::test]
async fn test_category_names_are_unique_except_for_self() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let world = app.create_category(&admin, "World").await;
    let sport = app.create_category(&admin, "Sport").await;

    let (status, body) = app
        .post(
            "/odata/categories",
            Some(&admin),
            json!({"categoryName": "World", "categoryDescription": "again"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Category name already exists");

    // Keeping its own name is not a conflict
    let (status, body) = app
        .put(
            &format!("/odata/categories/{world}"),
            Some(&admin),
            json!({"categoryName": "World", "categoryDescription": "Foreign desk", "isActive": false}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["isActive"], false);

    let (status, body) = app
        .put(
            &format!("/odata/categories/{sport}"),
            Some(&admin),
            json!({"categoryName": "World", "categoryDescription": "Sport desk"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Category name already exists");
}

#[tokio::test]
async fn test_category_validation_messages() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/odata/categories",
            Some(&admin),
            json!({"categoryName": "  ", "categoryDescription": "x".repeat(251)}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("categoryName is required"), "{message}");
    assert!(message.contains("categoryDescription must be at most 250 characters"), "{message}");
}

#[tokio::test]
async fn test_tag_names_are_unique_except_for_self() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let elections = app.create_tag(&admin, "elections").await;
    app.create_tag(&admin, "budget").await;

    let (status, body) = app
        .post("/odata/tags", Some(&admin), json!({"tagName": "budget"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Tag name already exists");

    let (status, body) = app
        .put(
            &format!("/odata/tags/{elections}"),
            Some(&admin),
            json!({"tagName": "elections", "note": "national and local"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["note"], "national and local");

    let (status, _) = app
        .put(
            &format!("/odata/tags/{elections}"),
            Some(&admin),
            json!({"tagName": "budget"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_account_emails_are_unique_except_for_self() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let first = app
        .create_account(&admin, "First", "first@newsdesk.org", 1)
        .await;
    app.create_account(&admin, "Second", "second@newsdesk.org", 2)
        .await;

    let (status, body) = app
        .post(
            "/odata/systemaccounts",
            Some(&admin),
            json!({
                "accountName": "Copy",
                "accountEmail": "second@newsdesk.org",
                "accountRole": 1,
                "accountPassword": "whatever-1",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already exists");

    // Password may be omitted on update
    let (status, body) = app
        .put(
            &format!("/odata/systemaccounts/{first}"),
            Some(&admin),
            json!({"accountName": "First Renamed", "accountEmail": "first@newsdesk.org", "accountRole": 2}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["roleName"], "Lecturer");

    let (status, _) = app
        .put(
            &format!("/odata/systemaccounts/{first}"),
            Some(&admin),
            json!({"accountName": "First", "accountEmail": "second@newsdesk.org", "accountRole": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_account_role_must_be_known() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/odata/systemaccounts",
            Some(&admin),
            json!({
                "accountName": "Odd",
                "accountEmail": "odd@newsdesk.org",
                "accountRole": 7,
                "accountPassword": "whatever-1",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid role"));
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let used = app.create_category(&admin, "Politics").await;
    let unused = app.create_category(&admin, "Weather").await;
    app.create_article(
        &admin,
        json!({"newsTitle": "Vote count", "headline": "Results tonight", "categoryId": used}),
    )
    .await;

    let (status, body) = app.get(&format!("/odata/categories/{used}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deletable"], false);

    let (status, body) = app
        .delete(&format!("/odata/categories/{used}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete a category that has news articles");

    let (status, body) = app
        .delete(&format!("/odata/categories/{unused}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let (status, body) = app
        .get(&format!("/odata/categories/{unused}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn test_tag_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let used = app.create_tag(&admin, "elections").await;
    let article = app
        .create_article(
            &admin,
            json!({"newsTitle": "Vote count", "headline": "Results tonight", "tagIds": [used]}),
        )
        .await;

    let (status, body) = app.delete(&format!("/odata/tags/{used}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete a tag that is used by news articles");

    // Once detached, the tag can go
    let id = article["newsArticleId"].as_i64().unwrap();
    let (status, _) = app
        .put(
            &format!("/odata/newsarticles/{id}"),
            Some(&admin),
            json!({"newsTitle": "Vote count", "headline": "Results tonight", "tagIds": []}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/odata/tags/{used}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_account_with_articles_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (author, staff) = app.staff(&admin, "desk@newsdesk.org").await;
    let idle = app
        .create_account(&admin, "Idle", "idle@newsdesk.org", 0)
        .await;
    app.create_article(
        &staff,
        json!({"newsTitle": "Harbour fire", "headline": "Crews on scene"}),
    )
    .await;

    let (status, body) = app
        .delete(&format!("/odata/systemaccounts/{author}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete an account that has news articles");

    let (status, body) = app
        .delete(&format!("/odata/systemaccounts/{idle}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account deleted successfully");
}
