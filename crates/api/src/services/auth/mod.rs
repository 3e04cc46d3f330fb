//! Authentication service.
//!
//! Password sign-in against persisted accounts (argon2 hashes) with a
//! fallback to the administrator defined in configuration, plus bearer token
//! issuance and verification.

mod error;
pub mod token;

pub use error::{AuthError, WRONG_CREDENTIALS};
pub use token::{Claims, IssuedToken, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use subtle::ConstantTimeEq;

use crate::config::ConfiguredAdmin;
use crate::db::AccountRepository;
use crate::models::Identity;
use crate::services::profile::Profile;

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub profile: Profile,
    pub token: IssuedToken,
}

/// Authentication service.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
    tokens: &'a TokenService,
    admin: &'a ConfiguredAdmin,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        pool: &'a SqlitePool,
        tokens: &'a TokenService,
        admin: &'a ConfiguredAdmin,
    ) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            tokens,
            admin,
        }
    }

    /// Sign in with email and password.
    ///
    /// Persisted accounts are checked first (exact email match); the configured
    /// admin is matched case-insensitively on email and exactly on password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if nothing matches.
    /// Returns `AuthError::Repository` if the account lookup fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = email.trim();

        if let Some((account, hash)) = self.accounts.find_for_login(email).await?
            && verify_password(password, &hash).is_ok()
        {
            let identity = Identity::Account {
                id: account.id,
                email: account.email.clone(),
                role: account.role,
            };
            let token = self.tokens.issue(&identity)?;
            tracing::info!(account_id = %account.id, "Account signed in");
            return Ok(LoginOutcome {
                profile: Profile::from_account(&account),
                token,
            });
        }

        if self.matches_configured_admin(email, password) {
            let identity = Identity::ConfiguredAdmin {
                email: self.admin.email.clone(),
            };
            let token = self.tokens.issue(&identity)?;
            tracing::info!("Configured admin signed in");
            return Ok(LoginOutcome {
                profile: Profile::configured_admin(self.admin),
                token,
            });
        }

        tracing::warn!("Rejected sign-in attempt");
        Err(AuthError::InvalidCredentials)
    }

    fn matches_configured_admin(&self, email: &str, password: &str) -> bool {
        let password_matches: bool = self
            .admin
            .password
            .expose_secret()
            .as_bytes()
            .ct_eq(password.as_bytes())
            .into();
        self.admin.email.matches_ignore_case(email) && password_matches
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
