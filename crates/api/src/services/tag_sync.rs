//! Article tag reconciliation.
//!
//! The stored tag set of an article is made equal to the requested list:
//! unknown tag IDs are dropped, duplicates collapse, and the result fully
//! replaces whatever was attached before. The change is applied as a diff
//! (detach removed, attach added) on the caller's transaction, so tags that
//! survive the update are never removed, even briefly.

use std::collections::{BTreeSet, HashSet};

use sqlx::SqliteConnection;

use newsdesk_core::{ArticleId, TagId};

use crate::db::{RepositoryError, articles};

/// The difference between the attached and the requested tag sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlan {
    /// Final tag set, ascending.
    pub target: Vec<TagId>,
    /// Tags to attach (requested, known, not yet attached).
    pub attach: Vec<TagId>,
    /// Tags to detach (attached, no longer requested).
    pub detach: Vec<TagId>,
}

impl TagPlan {
    /// Compute the plan. `known` is the set of tag IDs that exist.
    #[must_use]
    pub fn new(current: &[TagId], requested: &[TagId], known: &HashSet<TagId>) -> Self {
        let target: BTreeSet<TagId> = requested
            .iter()
            .copied()
            .filter(|id| known.contains(id))
            .collect();
        let current: BTreeSet<TagId> = current.iter().copied().collect();

        Self {
            attach: target.difference(&current).copied().collect(),
            detach: current.difference(&target).copied().collect(),
            target: target.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.attach.is_empty() && self.detach.is_empty()
    }
}

/// Make the article's tags exactly the known subset of `requested`.
///
/// Must run inside the transaction that created or updated the article row.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement fails; the caller's
/// transaction then rolls back as a whole.
pub async fn sync_article_tags(
    conn: &mut SqliteConnection,
    article: ArticleId,
    requested: &[TagId],
) -> Result<Vec<TagId>, RepositoryError> {
    let known = articles::existing_tag_ids(&mut *conn, requested).await?;
    let current = articles::attached_tag_ids(&mut *conn, article).await?;
    let plan = TagPlan::new(&current, requested, &known);

    if plan.is_noop() {
        return Ok(plan.target);
    }

    for tag in &plan.detach {
        articles::detach_tag(&mut *conn, article, *tag).await?;
    }
    for tag in &plan.attach {
        articles::attach_tag(&mut *conn, article, *tag).await?;
    }

    tracing::debug!(
        article_id = %article,
        attached = plan.attach.len(),
        detached = plan.detach.len(),
        "Article tags reconciled"
    );

    Ok(plan.target)
}
