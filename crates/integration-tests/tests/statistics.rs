//! The statistics report over a creation-date range.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use serde_json::json;

use newsdesk_api::db;
use newsdesk_api::models::ArticleDraft;
use newsdesk_integration_tests::TestApp;

#[tokio::test]
async fn test_report_counts_and_groups() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (author, staff) = app.staff(&admin, "desk@newsdesk.org").await;
    let politics = app.create_category(&admin, "Politics").await;
    let vote = app.create_tag(&admin, "vote").await;

    for title in ["One", "Two"] {
        app.create_article(
            &staff,
            json!({"newsTitle": title, "headline": "h", "categoryId": politics, "tagIds": [vote]}),
        )
        .await;
    }
    app.create_article(&admin, json!({"newsTitle": "Three", "headline": "h"}))
        .await;

    let (status, body) = app.get("/odata/newsstatistics", Some(&admin)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let report = &body["data"];
    assert_eq!(report["totalNewsCount"], 3);
    assert_eq!(report["totalAuthorsCount"], 1);
    assert_eq!(report["newsList"].as_array().unwrap().len(), 3);
    assert_eq!(
        report["authorStats"],
        json!([{"authorId": author, "authorName": "Desk Editor", "articleCount": 2}])
    );
    assert_eq!(report["categoryStats"][0]["articleCount"], 2);
    assert_eq!(report["tagStats"][0]["tagId"], vote);
}

#[tokio::test]
async fn test_report_is_idempotent() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let (_, first) = app.staff(&admin, "first@newsdesk.org").await;
    let (_, second) = app.staff(&admin, "second@newsdesk.org").await;
    let world = app.create_category(&admin, "World").await;
    let sport = app.create_category(&admin, "Sport").await;
    let red = app.create_tag(&admin, "red").await;
    let blue = app.create_tag(&admin, "blue").await;

    // Every author, category and tag ends up with two articles
    for (token, category, tag) in [
        (&first, world, red),
        (&second, sport, blue),
        (&first, sport, red),
        (&second, world, blue),
    ] {
        app.create_article(
            token,
            json!({"newsTitle": "Tied", "headline": "h", "categoryId": category, "tagIds": [tag]}),
        )
        .await;
    }

    let (status, first_report) = app.get("/odata/newsstatistics", Some(&admin)).await;
    let (_, second_report) = app.get("/odata/newsstatistics", Some(&admin)).await;

    assert_eq!(status, StatusCode::OK);
    for group in ["authorStats", "categoryStats", "tagStats"] {
        let stats = first_report["data"][group].as_array().unwrap();
        assert_eq!(stats.len(), 2, "{group}");
        assert!(stats.iter().all(|g| g["articleCount"] == 2), "{group}");
    }
    assert_eq!(first_report, second_report);
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .get(
            "/odata/newsstatistics?startDate=2024-06-01&endDate=2024-05-01",
            Some(&admin),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"].is_null());

    let (status, _) = app
        .get("/odata/newsstatistics?startDate=yesterday", Some(&admin))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_end_date_covers_the_whole_day() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let late_evening = Utc.with_ymd_and_hms(2024, 6, 1, 23, 59, 0).unwrap();
    {
        let mut conn = app.pool.acquire().await.unwrap();
        db::articles::insert(
            &mut conn,
            &ArticleDraft {
                title: "Late edition".to_string(),
                headline: "Filed at midnight".to_string(),
                content: None,
                source: None,
                category_id: None,
                is_published: true,
            },
            None,
            late_evening,
        )
        .await
        .unwrap();
    }

    let (status, body) = app
        .get(
            "/odata/newsstatistics?startDate=2024-06-01&endDate=2024-06-01",
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["totalNewsCount"], 1);

    let (_, body) = app
        .get(
            "/odata/newsstatistics?startDate=2024-05-01&endDate=2024-05-31",
            Some(&admin),
        )
        .await;
    assert_eq!(body["data"]["totalNewsCount"], 0);

    // Empty parameters mean an open range
    let (status, body) = app
        .get("/odata/newsstatistics?startDate=&endDate=", Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalNewsCount"], 1);
}
