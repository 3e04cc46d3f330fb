//! Account domain types.

use newsdesk_core::{AccountId, AccountRole, Email};

/// A persisted account (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Sign-in email, unique across accounts.
    pub email: Email,
    /// Permission level.
    pub role: AccountRole,
    /// Number of articles this account authored.
    pub article_count: i64,
}

impl Account {
    /// An account can be deleted only while it has authored no articles.
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        self.article_count == 0
    }
}

/// Values for inserting an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: Email,
    pub role: AccountRole,
    pub password_hash: String,
}

/// Values for an administrative full update.
///
/// `password_hash` is `None` when the stored hash must be kept.
#[derive(Debug, Clone)]
pub struct AccountChanges {
    pub name: String,
    pub email: Email,
    pub role: AccountRole,
    pub password_hash: Option<String>,
}
