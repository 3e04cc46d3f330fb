//! The authenticated caller of a request.

use newsdesk_core::{AccountId, AccountRole, Email};

/// Identity decoded from a bearer token and passed explicitly into services.
///
/// The configured administrator is not a database row, so it is a separate
/// variant rather than an account with a magic ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// A persisted account.
    Account {
        id: AccountId,
        email: Email,
        role: AccountRole,
    },
    /// The administrator defined in deployment configuration.
    ConfiguredAdmin { email: Email },
}

impl Identity {
    /// Role used by the access policy.
    #[must_use]
    pub const fn role(&self) -> AccountRole {
        match self {
            Self::Account { role, .. } => *role,
            Self::ConfiguredAdmin { .. } => AccountRole::Admin,
        }
    }

    /// Database ID, if the caller is a persisted account.
    #[must_use]
    pub const fn account_id(&self) -> Option<AccountId> {
        match self {
            Self::Account { id, .. } => Some(*id),
            Self::ConfiguredAdmin { .. } => None,
        }
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        match self {
            Self::Account { email, .. } | Self::ConfiguredAdmin { email } => email,
        }
    }
}
