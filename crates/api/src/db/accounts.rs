//! Account repository for database operations.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate builds
//! without a live database.

use sqlx::SqlitePool;

use newsdesk_core::{AccountId, AccountRole, Email};

use super::{RepositoryError, map_constraint_error};
use crate::models::account::{Account, AccountChanges, NewAccount};

const EMAIL_CONFLICT: &str = "Email already exists";
const IN_USE_CONFLICT: &str = "Cannot delete an account that has news articles";

const SELECT_ACCOUNT: &str = r"
    SELECT a.id, a.name, a.email, a.role,
           (SELECT COUNT(*) FROM news_article n WHERE n.created_by_id = a.id) AS article_count
    FROM system_account a
";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i32,
    name: String,
    email: String,
    role: i32,
    article_count: i64,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = AccountRole::from_code(row.role).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            id: AccountId::new(row.id),
            name: row.name,
            email,
            role,
            article_count: row.article_count,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LoginRow {
    id: i32,
    name: String,
    email: String,
    role: i32,
    article_count: i64,
    password_hash: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all accounts ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!("{SELECT_ACCOUNT} ORDER BY a.id"))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!("{SELECT_ACCOUNT} WHERE a.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an account and its password hash by exact email, for sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn find_for_login(
        &self,
        email: &str,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginRow>(
            r"
            SELECT a.id, a.name, a.email, a.role, a.password_hash,
                   (SELECT COUNT(*) FROM news_article n WHERE n.created_by_id = a.id) AS article_count
            FROM system_account a
            WHERE a.email = ?
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            let account = Account::try_from(AccountRow {
                id: row.id,
                name: row.name,
                email: row.email,
                role: row.role,
                article_count: row.article_count,
            })?;
            Ok((account, row.password_hash))
        })
        .transpose()
    }

    /// Get the stored password hash of an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn password_hash(&self, id: AccountId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM system_account WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(hash)
    }

    /// Whether another account already uses `email` (exact match).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(
        &self,
        email: &str,
        exclude: Option<AccountId>,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM system_account WHERE email = ? AND (? IS NULL OR id <> ?))",
        )
        .bind(email)
        .bind(exclude)
        .bind(exclude)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Whether any article names this account as its author.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_articles(&self, id: AccountId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM news_article WHERE created_by_id = ?)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        let id = sqlx::query_scalar::<_, AccountId>(
            r"
            INSERT INTO system_account (name, email, password_hash, role)
            VALUES (?, ?, ?, ?)
            RETURNING id
            ",
        )
        .bind(&account.name)
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.role.code())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, EMAIL_CONFLICT))?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Overwrite name, email and role, and the password hash when one is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    /// Returns `RepositoryError::Conflict` if the email belongs to another account.
    pub async fn update(
        &self,
        id: AccountId,
        changes: &AccountChanges,
    ) -> Result<Account, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE system_account
            SET name = ?, email = ?, role = ?, password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            ",
        )
        .bind(&changes.name)
        .bind(changes.email.as_str())
        .bind(changes.role.code())
        .bind(changes.password_hash.as_deref())
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, EMAIL_CONFLICT))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Self-service update of name and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    /// Returns `RepositoryError::Conflict` if the email belongs to another account.
    pub async fn update_profile(
        &self,
        id: AccountId,
        name: &str,
        email: &Email,
    ) -> Result<Account, RepositoryError> {
        let result = sqlx::query("UPDATE system_account SET name = ?, email = ? WHERE id = ?")
            .bind(name)
            .bind(email.as_str())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_constraint_error(e, EMAIL_CONFLICT))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace the stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    pub async fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE system_account SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an account.
    ///
    /// The foreign key from `news_article.created_by_id` blocks deleting an
    /// author, which surfaces as `Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    /// Returns `RepositoryError::Conflict` if the account still has articles.
    pub async fn delete(&self, id: AccountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM system_account WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_constraint_error(e, IN_USE_CONFLICT))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Reporter".to_string(),
            email: Email::parse(email).unwrap(),
            role: AccountRole::Staff,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let pool = create_memory_pool().await.unwrap();
        let repo = AccountRepository::new(&pool);

        let created = repo.create(&new_account("a@newsdesk.org")).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.role, AccountRole::Staff);
        assert!(fetched.is_deletable());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let pool = create_memory_pool().await.unwrap();
        let repo = AccountRepository::new(&pool);

        repo.create(&new_account("dup@newsdesk.org")).await.unwrap();
        let err = repo.create(&new_account("dup@newsdesk.org")).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(msg) if msg == EMAIL_CONFLICT));
    }

    #[tokio::test]
    async fn test_email_exists_honours_exclusion() {
        let pool = create_memory_pool().await.unwrap();
        let repo = AccountRepository::new(&pool);
        let account = repo.create(&new_account("self@newsdesk.org")).await.unwrap();

        assert!(repo.email_exists("self@newsdesk.org", None).await.unwrap());
        assert!(
            !repo
                .email_exists("self@newsdesk.org", Some(account.id))
                .await
                .unwrap()
        );
        assert!(!repo.email_exists("SELF@newsdesk.org", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_password_when_absent() {
        let pool = create_memory_pool().await.unwrap();
        let repo = AccountRepository::new(&pool);
        let account = repo.create(&new_account("keep@newsdesk.org")).await.unwrap();

        let changes = AccountChanges {
            name: "Renamed".to_string(),
            email: account.email.clone(),
            role: AccountRole::Lecturer,
            password_hash: None,
        };
        let updated = repo.update(account.id, &changes).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.role, AccountRole::Lecturer);
        assert_eq!(
            repo.password_hash(account.id).await.unwrap().as_deref(),
            Some("hash")
        );
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let pool = create_memory_pool().await.unwrap();
        let repo = AccountRepository::new(&pool);

        let err = repo.delete(AccountId::new(99)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
