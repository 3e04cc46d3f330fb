//! Aggregate article statistics over a creation-date range.
//!
//! [`aggregate`] is pure: given the articles inside the range (newest first)
//! it groups them by author, category and tag. [`compute`] fetches the input
//! and calls it.

use std::collections::HashMap;
use std::hash::Hash;

use sqlx::SqlitePool;

use newsdesk_core::{AccountId, CategoryId, DateRange, TagId};

use crate::db::{ArticleRepository, RepositoryError};
use crate::models::Article;

/// Number of most recent articles listed in the report.
pub const RECENT_LIMIT: usize = 10;

/// Article count for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount<Id> {
    pub id: Id,
    pub name: String,
    pub article_count: usize,
}

/// The statistics report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsStatistics {
    /// The requested range, echoed back.
    pub range: DateRange,
    pub total_news_count: usize,
    /// Number of distinct author groups.
    pub total_authors_count: usize,
    /// Up to ten newest articles in the range.
    pub news_list: Vec<Article>,
    pub author_stats: Vec<GroupCount<AccountId>>,
    pub category_stats: Vec<GroupCount<CategoryId>>,
    pub tag_stats: Vec<GroupCount<TagId>>,
}

/// Counts occurrences per key, remembering first-seen order for stable ties.
struct Tally<Id> {
    index: HashMap<Id, usize>,
    groups: Vec<GroupCount<Id>>,
}

impl<Id: Copy + Eq + Hash> Tally<Id> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn add(&mut self, id: Id, name: &str) {
        if let Some(&slot) = self.index.get(&id) {
            if let Some(group) = self.groups.get_mut(slot) {
                group.article_count += 1;
            }
            return;
        }
        self.index.insert(id, self.groups.len());
        self.groups.push(GroupCount {
            id,
            name: name.to_owned(),
            article_count: 1,
        });
    }

    /// Groups by descending count; equal counts keep first-seen order.
    fn into_sorted(self) -> Vec<GroupCount<Id>> {
        let mut groups = self.groups;
        groups.sort_by(|a, b| b.article_count.cmp(&a.article_count));
        groups
    }
}

/// Build the report from the articles inside `range`.
///
/// `articles` must already be filtered to the range; the newest-first order
/// determines both the recent list and tie order within each group list.
#[must_use]
pub fn aggregate(range: DateRange, mut articles: Vec<Article>) -> NewsStatistics {
    articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let mut authors = Tally::new();
    let mut categories = Tally::new();
    let mut tags = Tally::new();

    for article in &articles {
        if let Some(author) = &article.author {
            authors.add(author.id, &author.name);
        }
        if let Some(category) = &article.category {
            categories.add(category.id, &category.name);
        }
        for tag in &article.tags {
            tags.add(tag.id, &tag.name);
        }
    }

    let author_stats = authors.into_sorted();
    let total_news_count = articles.len();
    articles.truncate(RECENT_LIMIT);

    NewsStatistics {
        range,
        total_news_count,
        total_authors_count: author_stats.len(),
        news_list: articles,
        author_stats,
        category_stats: categories.into_sorted(),
        tag_stats: tags.into_sorted(),
    }
}

/// Fetch the articles created inside `range` and aggregate them.
///
/// # Errors
///
/// Returns `RepositoryError` if the articles cannot be read.
pub async fn compute(pool: &SqlitePool, range: DateRange) -> Result<NewsStatistics, RepositoryError> {
    let articles = ArticleRepository::new(pool).created_within(&range).await?;
    let report = aggregate(range, articles);

    tracing::debug!(
        total_news = report.total_news_count,
        total_authors = report.total_authors_count,
        "Statistics computed"
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use newsdesk_core::ArticleId;

    use crate::models::{AuthorRef, CategoryRef, TagRef};

    fn article(id: i32, minutes: i64, author: Option<i32>, category: Option<i32>, tags: &[i32]) -> Article {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        Article {
            id: ArticleId::new(id),
            title: format!("Article {id}"),
            headline: "Headline".to_string(),
            content: None,
            source: None,
            is_published: true,
            created_at: created,
            modified_at: created,
            category: category.map(|c| CategoryRef {
                id: CategoryId::new(c),
                name: format!("Category {c}"),
            }),
            author: author.map(|a| AuthorRef {
                id: AccountId::new(a),
                name: format!("Author {a}"),
            }),
            updated_by: None,
            tags: tags
                .iter()
                .map(|&t| TagRef {
                    id: TagId::new(t),
                    name: format!("Tag {t}"),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_input() {
        let report = aggregate(DateRange::unbounded(), Vec::new());
        assert_eq!(report.total_news_count, 0);
        assert_eq!(report.total_authors_count, 0);
        assert!(report.news_list.is_empty());
        assert!(report.author_stats.is_empty());
    }

    #[test]
    fn test_groups_sorted_by_count_descending() {
        let report = aggregate(
            DateRange::unbounded(),
            vec![
                article(1, 1, Some(1), Some(10), &[100]),
                article(2, 2, Some(2), Some(20), &[100, 200]),
                article(3, 3, Some(2), Some(20), &[200]),
                article(4, 4, Some(2), None, &[200]),
            ],
        );

        assert_eq!(report.total_news_count, 4);
        assert_eq!(report.total_authors_count, 2);

        let authors: Vec<_> = report
            .author_stats
            .iter()
            .map(|g| (g.id.as_i32(), g.article_count))
            .collect();
        assert_eq!(authors, vec![(2, 3), (1, 1)]);

        let categories: Vec<_> = report
            .category_stats
            .iter()
            .map(|g| (g.id.as_i32(), g.article_count))
            .collect();
        assert_eq!(categories, vec![(20, 2), (10, 1)]);

        let tags: Vec<_> = report
            .tag_stats
            .iter()
            .map(|g| (g.id.as_i32(), g.article_count))
            .collect();
        assert_eq!(tags, vec![(200, 3), (100, 2)]);
    }

    #[test]
    fn test_articles_without_author_or_category_are_not_grouped() {
        let report = aggregate(
            DateRange::unbounded(),
            vec![article(1, 1, None, None, &[]), article(2, 2, Some(5), None, &[])],
        );

        assert_eq!(report.total_news_count, 2);
        assert_eq!(report.total_authors_count, 1);
        assert!(report.category_stats.is_empty());
    }

    #[test]
    fn test_recent_list_is_ten_newest() {
        let articles = (1..=12).map(|i| article(i, i64::from(i), Some(1), None, &[])).collect();
        let report = aggregate(DateRange::unbounded(), articles);

        let ids: Vec<i32> = report.news_list.iter().map(|a| a.id.as_i32()).collect();
        assert_eq!(ids, (3..=12).rev().collect::<Vec<_>>());
        assert_eq!(report.total_news_count, 12);
    }

    #[test]
    fn test_ties_keep_newest_first_order() {
        let report = aggregate(
            DateRange::unbounded(),
            vec![article(1, 1, Some(1), None, &[]), article(2, 2, Some(2), None, &[])],
        );

        let authors: Vec<i32> = report.author_stats.iter().map(|g| g.id.as_i32()).collect();
        assert_eq!(authors, vec![2, 1]);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let input = vec![
            article(1, 5, Some(1), Some(1), &[1, 2]),
            article(2, 5, Some(2), Some(1), &[2]),
            article(3, 1, Some(1), Some(2), &[1]),
        ];
        let first = aggregate(DateRange::unbounded(), input.clone());
        let mut shuffled = input;
        shuffled.reverse();
        let second = aggregate(DateRange::unbounded(), shuffled);

        assert_eq!(first, second);
    }
}
