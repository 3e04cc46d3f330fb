//! Account roles.

use serde::{Deserialize, Serialize};

/// Error returned when a role code or name is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("unknown role code: {0}")]
    UnknownCode(i32),
    #[error("unknown role name: {0}")]
    UnknownName(String),
}

/// Role of an account, persisted and transmitted as its integer code.
///
/// The set is closed: every code outside `0..=3` is rejected rather than
/// mapped to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum AccountRole {
    /// Read-only account with no management rights.
    Viewer,
    /// Newsroom staff. Manages categories, tags and articles.
    Staff,
    /// Guest author. Can sign in and manage its own profile.
    Lecturer,
    /// Full access, including account management.
    Admin,
}

impl AccountRole {
    /// All roles in code order.
    pub const ALL: [Self; 4] = [Self::Viewer, Self::Staff, Self::Lecturer, Self::Admin];

    /// Integer code stored in `system_account.role` and in token claims.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Viewer => 0,
            Self::Staff => 1,
            Self::Lecturer => 2,
            Self::Admin => 3,
        }
    }

    /// Resolve a role from its integer code.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::UnknownCode` for any code outside `0..=3`.
    pub const fn from_code(code: i32) -> Result<Self, RoleError> {
        match code {
            0 => Ok(Self::Viewer),
            1 => Ok(Self::Staff),
            2 => Ok(Self::Lecturer),
            3 => Ok(Self::Admin),
            other => Err(RoleError::UnknownCode(other)),
        }
    }

    /// Human-readable label shown to clients.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Viewer => "Viewer",
            Self::Staff => "Staff",
            Self::Lecturer => "Lecturer",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for AccountRole {
    type Err = RoleError;

    /// Accepts either the display name (any case) or the integer code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Self::from_code(code);
        }
        Self::ALL
            .into_iter()
            .find(|role| role.display_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RoleError::UnknownName(s.to_owned()))
    }
}

impl TryFrom<i32> for AccountRole {
    type Error = RoleError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<AccountRole> for i32 {
    fn from(role: AccountRole) -> Self {
        role.code()
    }
}
