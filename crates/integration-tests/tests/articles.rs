//! Article lifecycle: tag reconciliation, authorship and the public feed.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use newsdesk_integration_tests::{TestApp, tag_ids};

#[tokio::test]
async fn test_tag_set_is_replaced_on_update() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let t1 = app.create_tag(&admin, "elections").await;
    let t2 = app.create_tag(&admin, "budget").await;
    let t3 = app.create_tag(&admin, "housing").await;

    // Duplicates collapse and unknown IDs are dropped
    let article = app
        .create_article(
            &admin,
            json!({
                "newsTitle": "Budget vote",
                "headline": "Council splits",
                "tagIds": [t1, t2, t2, 9999],
            }),
        )
        .await;
    assert_eq!(tag_ids(&article), vec![t1, t2]);

    let id = article["newsArticleId"].as_i64().unwrap();
    let (status, body) = app
        .put(
            &format!("/odata/newsarticles/{id}"),
            Some(&admin),
            json!({"newsTitle": "Budget vote", "headline": "Council splits", "tagIds": [t2, t3]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "News article updated successfully");
    assert_eq!(tag_ids(&body["data"]), vec![t2, t3]);

    // Omitting tagIds clears the set
    let (status, body) = app
        .put(
            &format!("/odata/newsarticles/{id}"),
            Some(&admin),
            json!({"newsTitle": "Budget vote", "headline": "Council splits"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tag_ids(&body["data"]), Vec::<i64>::new());
}

#[tokio::test]
async fn test_author_is_kept_and_modifier_recorded() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (author, first) = app.staff(&admin, "first@newsdesk.org").await;
    let (editor, second) = app.staff(&admin, "second@newsdesk.org").await;

    let article = app
        .create_article(
            &first,
            json!({"newsTitle": "Storm warning", "headline": "Coast braces", "newsStatus": true}),
        )
        .await;
    assert_eq!(article["createdById"], author);
    assert_eq!(article["authorName"], "Desk Editor");
    assert_eq!(article["updatedById"], author);

    let id = article["newsArticleId"].as_i64().unwrap();
    let (status, body) = app
        .put(
            &format!("/odata/newsarticles/{id}"),
            Some(&second),
            json!({"newsTitle": "Storm update", "headline": "Coast braces"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["createdById"], author);
    assert_eq!(body["data"]["updatedById"], editor);
    assert_eq!(body["data"]["newsTitle"], "Storm update");
}

#[tokio::test]
async fn test_configured_admin_articles_have_no_author() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let article = app
        .create_article(
            &admin,
            json!({"newsTitle": "Notice", "headline": "Office closed"}),
        )
        .await;

    assert!(article["createdById"].is_null());
    assert!(article["updatedById"].is_null());
    assert_eq!(article["newsStatus"], true);

    let (status, body) = app.get("/odata/newsarticles/mine", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], json!([]));
}

#[tokio::test]
async fn test_mine_lists_only_own_articles() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (_, first) = app.staff(&admin, "first@newsdesk.org").await;
    let (_, second) = app.staff(&admin, "second@newsdesk.org").await;
    app.create_article(&first, json!({"newsTitle": "Mine", "headline": "One"}))
        .await;
    app.create_article(&second, json!({"newsTitle": "Theirs", "headline": "Two"}))
        .await;

    let (status, body) = app.get("/odata/newsarticles/mine", Some(&first)).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]["value"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["newsTitle"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Mine"]);
}

#[tokio::test]
async fn test_article_validation() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/odata/newsarticles",
            Some(&admin),
            json!({"newsTitle": "No headline"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("headline is required"));

    let (status, body) = app
        .post(
            "/odata/newsarticles",
            Some(&admin),
            json!({"newsTitle": "Lost", "headline": "Nowhere", "categoryId": 404}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Category not found");

    let (status, body) = app
        .put(
            "/odata/newsarticles/404",
            Some(&admin),
            json!({"newsTitle": "Ghost", "headline": "Gone"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "News article not found");
}

#[tokio::test]
async fn test_public_feed_shows_published_only() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let published = app
        .create_article(
            &admin,
            json!({"newsTitle": "Out now", "headline": "Live"}),
        )
        .await;
    let draft = app
        .create_article(
            &admin,
            json!({"newsTitle": "Draft", "headline": "Hidden", "newsStatus": false}),
        )
        .await;

    let (status, body) = app.get("/odata/publicnewsarticles", None).await;
    assert_eq!(status, StatusCode::OK);
    let value = body["data"]["value"].as_array().unwrap();
    assert_eq!(value.len(), 1);
    assert_eq!(value[0]["newsTitle"], "Out now");
    assert!(value[0].get("newsStatus").is_none());
    assert!(value[0].get("updatedById").is_none());

    let id = published["newsArticleId"].as_i64().unwrap();
    let (status, _) = app.get(&format!("/odata/publicnewsarticles/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let id = draft["newsArticleId"].as_i64().unwrap();
    let (status, body) = app.get(&format!("/odata/publicnewsarticles/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "News article not found");

    // The editorial list still has both
    let (_, body) = app.get("/odata/newsarticles", Some(&admin)).await;
    assert_eq!(body["data"]["value"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_article_releases_tags() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let tag = app.create_tag(&admin, "weather").await;
    let article = app
        .create_article(
            &admin,
            json!({"newsTitle": "Rain", "headline": "Again", "tagIds": [tag]}),
        )
        .await;
    let id = article["newsArticleId"].as_i64().unwrap();

    let (status, body) = app
        .delete(&format!("/odata/newsarticles/{id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "News article deleted successfully");

    let (status, _) = app.get(&format!("/odata/newsarticles/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/odata/tags/{tag}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
}
