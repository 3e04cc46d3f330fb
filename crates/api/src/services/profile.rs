//! Self-service profile operations for the signed-in caller.

use sqlx::SqlitePool;

use newsdesk_core::{AccountRole, Email};

use crate::config::ConfiguredAdmin;
use crate::db::AccountRepository;
use crate::error::AppError;
use crate::models::{Account, Identity};
use crate::services::accounts::{MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, parse_email};
use crate::services::auth::{hash_password, verify_password};
use crate::services::policy::{SelfServiceChange, ensure_self_service_mutation};
use crate::services::validation::{Violations, ensure_unique};

/// The caller's own profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Account ID, `0` for the configured admin.
    pub account_id: i32,
    pub name: String,
    pub email: Email,
    pub role: AccountRole,
}

impl Profile {
    #[must_use]
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_id: account.id.as_i32(),
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }

    #[must_use]
    pub fn configured_admin(admin: &ConfiguredAdmin) -> Self {
        Self {
            account_id: 0,
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: AccountRole::Admin,
        }
    }
}

/// Self-service operations.
pub struct ProfileService<'a> {
    accounts: AccountRepository<'a>,
    admin: &'a ConfiguredAdmin,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, admin: &'a ConfiguredAdmin) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            admin,
        }
    }

    /// Read the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the caller's account no longer exists.
    pub async fn get(&self, identity: &Identity) -> Result<Profile, AppError> {
        match identity {
            Identity::ConfiguredAdmin { .. } => Ok(Profile::configured_admin(self.admin)),
            Identity::Account { id, .. } => {
                let account = self
                    .accounts
                    .get_by_id(*id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;
                Ok(Profile::from_account(&account))
            }
        }
    }

    /// Change the caller's name and/or email. Absent fields keep their value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for admins or invalid input,
    /// `AppError::Conflict` if the email belongs to another account, and
    /// `AppError::NotFound` if the caller's account no longer exists.
    pub async fn update_info(
        &self,
        identity: &Identity,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Profile, AppError> {
        ensure_self_service_mutation(identity, SelfServiceChange::Profile)?;
        let account = self.own_account(identity).await?;

        let mut violations = Violations::new();
        if name.is_some() {
            violations
                .required("accountName", name)
                .max_len("accountName", name, MAX_NAME_LENGTH);
        }
        violations.max_len("accountEmail", email, MAX_EMAIL_LENGTH);
        let parsed_email = email.map(|raw| parse_email(raw, &mut violations));
        violations.finish()?;

        let name = name.map_or_else(|| account.name.clone(), |n| n.trim().to_string());
        let email = parsed_email.flatten().unwrap_or_else(|| account.email.clone());

        ensure_unique(&self.accounts, email.as_str(), Some(account.id)).await?;
        let updated = self.accounts.update_profile(account.id, &name, &email).await?;

        tracing::info!(account_id = %account.id, "Profile updated");
        Ok(Profile::from_account(&updated))
    }

    /// Change the caller's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for admins, a blank new password, or a
    /// wrong current password.
    pub async fn change_password(
        &self,
        identity: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        ensure_self_service_mutation(identity, SelfServiceChange::Password)?;
        let account = self.own_account(identity).await?;

        let mut violations = Violations::new();
        violations
            .required("currentPassword", Some(current_password))
            .required("newPassword", Some(new_password));
        violations.finish()?;

        let stored = self
            .accounts
            .password_hash(account.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;
        if verify_password(current_password, &stored).is_err() {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let hash = hash_password(new_password)?;
        self.accounts.update_password(account.id, &hash).await?;

        tracing::info!(account_id = %account.id, "Password changed");
        Ok(())
    }

    async fn own_account(&self, identity: &Identity) -> Result<Account, AppError> {
        let Some(id) = identity.account_id() else {
            return Err(AppError::BadRequest(
                "Admin profile cannot be changed via API".to_string(),
            ));
        };
        self.accounts
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))
    }
}
