//! Access policy: which roles may perform which operations.
//!
//! [`authorize`] is a pure function of the caller's role and the requested
//! operation. Handlers call it with the identity decoded from the bearer
//! token; nothing here reads request state.

use newsdesk_core::AccountRole;

use crate::error::AppError;
use crate::models::Identity;

/// Operations guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// List, view, create, update or delete any account.
    ManageAccounts,
    /// List, create, update or delete categories.
    ManageCategories,
    /// List, create, update or delete tags.
    ManageTags,
    /// List all articles (including unpublished), create, update or delete.
    ManageArticles,
    /// Read the aggregate statistics report.
    ViewStatistics,
    /// Read the published-article feed.
    ReadPublishedArticles,
    /// Read or change one's own profile and password.
    SelfService,
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No valid credential was presented.
    Unauthenticated,
    /// The credential is valid but its role is not allowed.
    InsufficientRole,
}

/// Decide whether `role` (or an anonymous caller, for `None`) may perform `operation`.
///
/// # Errors
///
/// Returns the reason for refusal.
pub const fn authorize(role: Option<AccountRole>, operation: Operation) -> Result<(), Denial> {
    if matches!(operation, Operation::ReadPublishedArticles) {
        return Ok(());
    }

    let Some(role) = role else {
        return Err(Denial::Unauthenticated);
    };

    let allowed = match operation {
        Operation::ManageAccounts => matches!(role, AccountRole::Admin),
        Operation::ManageCategories
        | Operation::ManageTags
        | Operation::ManageArticles
        | Operation::ViewStatistics => matches!(role, AccountRole::Staff | AccountRole::Admin),
        Operation::SelfService | Operation::ReadPublishedArticles => true,
    };

    if allowed {
        Ok(())
    } else {
        Err(Denial::InsufficientRole)
    }
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => Self::Unauthorized("no credential".to_string()),
            Denial::InsufficientRole => Self::Forbidden("role not permitted".to_string()),
        }
    }
}

/// Authorize an authenticated caller, converting a refusal into an `AppError`.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when the caller's role is not allowed.
pub fn require(identity: &Identity, operation: Operation) -> Result<(), AppError> {
    authorize(Some(identity.role()), operation).map_err(|denial| {
        tracing::debug!(role = %identity.role(), ?operation, "Operation refused");
        denial.into()
    })
}

/// Self-service changes that are refused for admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfServiceChange {
    Password,
    Profile,
}

/// Admin profiles come from configuration, so self-service mutation is refused
/// for any admin-role caller regardless of the payload.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for admin-role callers.
pub fn ensure_self_service_mutation(
    identity: &Identity,
    change: SelfServiceChange,
) -> Result<(), AppError> {
    if identity.role() != AccountRole::Admin {
        return Ok(());
    }
    let message = match change {
        SelfServiceChange::Password => "Admin password cannot be changed via API",
        SelfServiceChange::Profile => "Admin profile cannot be changed via API",
    };
    Err(AppError::BadRequest(message.to_string()))
}
