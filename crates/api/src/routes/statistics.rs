//! `GET /newsstatistics?startDate=&endDate=`

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use newsdesk_core::DateRange;

use crate::{
    error::AppError,
    extract::AppQuery,
    middleware::RequireAuth,
    response::ApiResponse,
    services::{NewsStatistics, Operation, require, statistics},
    state::AppState,
};

use super::articles::ArticleView;

pub fn router() -> Router<AppState> {
    Router::new().route("/newsstatistics", get(show))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorStatView {
    pub author_id: i32,
    pub author_name: String,
    pub article_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatView {
    pub category_id: i32,
    pub category_name: String,
    pub article_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStatView {
    pub tag_id: i32,
    pub tag_name: String,
    pub article_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsView {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub total_news_count: usize,
    pub total_authors_count: usize,
    pub news_list: Vec<ArticleView>,
    pub author_stats: Vec<AuthorStatView>,
    pub category_stats: Vec<CategoryStatView>,
    pub tag_stats: Vec<TagStatView>,
}

impl From<&NewsStatistics> for StatisticsView {
    fn from(report: &NewsStatistics) -> Self {
        Self {
            start_date: report.range.start(),
            end_date: report.range.end(),
            total_news_count: report.total_news_count,
            total_authors_count: report.total_authors_count,
            news_list: report.news_list.iter().map(ArticleView::from).collect(),
            author_stats: report
                .author_stats
                .iter()
                .map(|g| AuthorStatView {
                    author_id: g.id.as_i32(),
                    author_name: g.name.clone(),
                    article_count: g.article_count,
                })
                .collect(),
            category_stats: report
                .category_stats
                .iter()
                .map(|g| CategoryStatView {
                    category_id: g.id.as_i32(),
                    category_name: g.name.clone(),
                    article_count: g.article_count,
                })
                .collect(),
            tag_stats: report
                .tag_stats
                .iter()
                .map(|g| TagStatView {
                    tag_id: g.id.as_i32(),
                    tag_name: g.name.clone(),
                    article_count: g.article_count,
                })
                .collect(),
        }
    }
}

#[instrument(skip(identity, state))]
async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<StatisticsParams>,
) -> Result<ApiResponse<StatisticsView>, AppError> {
    require(&identity, Operation::ViewStatistics)?;

    let range = DateRange::parse(
        params.start_date.as_deref().filter(|s| !s.is_empty()),
        params.end_date.as_deref().filter(|s| !s.is_empty()),
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let report = statistics::compute(state.pool(), range).await?;
    Ok(ApiResponse::ok(StatisticsView::from(&report)))
}
