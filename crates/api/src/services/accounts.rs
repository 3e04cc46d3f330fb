//! Account administration.

use sqlx::SqlitePool;

use newsdesk_core::{AccountId, AccountRole, Email};

use crate::db::AccountRepository;
use crate::error::AppError;
use crate::models::{Account, AccountChanges, NewAccount};
use crate::services::auth::hash_password;
use crate::services::validation::{Violations, ensure_deletable, ensure_unique, not_found};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 70;

/// Raw account fields as submitted by an administrator.
#[derive(Debug, Clone, Default)]
pub struct AccountInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<i32>,
    /// Required on create; on update, absent or empty keeps the current password.
    pub password: Option<String>,
}

struct ValidAccount {
    name: String,
    email: Email,
    role: AccountRole,
    password: Option<String>,
}

/// Parse an email, recording a violation instead of failing.
pub(crate) fn parse_email(raw: &str, violations: &mut Violations) -> Option<Email> {
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(e) => {
            violations.push(format!("accountEmail: {e}"));
            None
        }
    }
}

impl AccountInput {
    fn validate(self, password_required: bool) -> Result<ValidAccount, AppError> {
        let mut violations = Violations::new();
        violations
            .required("accountName", self.name.as_deref())
            .max_len("accountName", self.name.as_deref(), MAX_NAME_LENGTH)
            .required("accountEmail", self.email.as_deref())
            .max_len("accountEmail", self.email.as_deref(), MAX_EMAIL_LENGTH);
        if password_required {
            violations.required("accountPassword", self.password.as_deref());
        }

        let email = self
            .email
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| parse_email(raw, &mut violations));

        let role = match self.role {
            None => {
                violations.push("accountRole is required");
                None
            }
            Some(code) => AccountRole::from_code(code).map_or_else(
                |_| {
                    violations.push("Invalid role");
                    None
                },
                Some,
            ),
        };

        violations.finish()?;

        match (self.name, email, role) {
            (Some(name), Some(email), Some(role)) => Ok(ValidAccount {
                name: name.trim().to_string(),
                email,
                role,
                password: self.password.filter(|p| !p.is_empty()),
            }),
            _ => Err(AppError::BadRequest("Invalid account".to_string())),
        }
    }
}

/// Account administration service.
pub struct AccountService<'a> {
    accounts: AccountRepository<'a>,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
        }
    }

    /// All accounts.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the read fails.
    pub async fn list(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.accounts.list_all().await?)
    }

    /// One account.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if it does not exist.
    pub async fn get(&self, id: AccountId) -> Result<Account, AppError> {
        self.accounts
            .get_by_id(id)
            .await?
            .ok_or_else(not_found::<AccountRepository<'_>>)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for invalid input or
    /// `AppError::Conflict` if the email is taken.
    pub async fn create(&self, input: AccountInput) -> Result<Account, AppError> {
        let valid = input.validate(true)?;
        ensure_unique(&self.accounts, valid.email.as_str(), None).await?;

        let password = valid.password.unwrap_or_default();
        let account = self
            .accounts
            .create(&NewAccount {
                name: valid.name,
                email: valid.email,
                role: valid.role,
                password_hash: hash_password(&password)?,
            })
            .await?;

        tracing::info!(account_id = %account.id, role = %account.role, "Account created");
        Ok(account)
    }

    /// Overwrite an account. The password changes only when one is supplied.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound`, `AppError::BadRequest` or
    /// `AppError::Conflict` (email taken by another account).
    pub async fn update(&self, id: AccountId, input: AccountInput) -> Result<Account, AppError> {
        self.get(id).await?;
        let valid = input.validate(false)?;
        ensure_unique(&self.accounts, valid.email.as_str(), Some(id)).await?;

        let password_hash = valid.password.as_deref().map(hash_password).transpose()?;
        let account = self
            .accounts
            .update(
                id,
                &AccountChanges {
                    name: valid.name,
                    email: valid.email,
                    role: valid.role,
                    password_hash,
                },
            )
            .await?;

        tracing::info!(account_id = %id, "Account updated");
        Ok(account)
    }

    /// Delete an account that has authored no articles.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` or `AppError::Conflict` (account has articles).
    pub async fn delete(&self, id: AccountId) -> Result<(), AppError> {
        ensure_deletable(&self.accounts, id).await?;
        self.accounts.delete(id).await?;

        tracing::info!(account_id = %id, "Account deleted");
        Ok(())
    }
}
