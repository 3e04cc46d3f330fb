//! Account bootstrap commands.
//!
//! # Usage
//!
//! ```bash
//! # Prompts for the password when --password is omitted
//! newsdesk account create -e editor@example.com -n "Desk Editor" -r staff
//! ```
//!
//! The configured administrator never needs an account row; use this to
//! create the first persisted accounts.

use std::io::BufRead;

use newsdesk_api::services::{AccountInput, AccountService};
use newsdesk_core::AccountRole;

use super::{CommandError, connect};

/// Create a persisted account through the same validation as the API.
///
/// # Returns
///
/// The ID of the created account.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: Option<String>,
) -> Result<i32, CommandError> {
    let role: AccountRole = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;

    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    let pool = connect().await?;

    tracing::info!("Creating account: {} ({})", email, role);
    let account = AccountService::new(&pool)
        .create(AccountInput {
            name: Some(name.to_owned()),
            email: Some(email.to_owned()),
            role: Some(role.code()),
            password: Some(password),
        })
        .await
        .map_err(|e| CommandError::Rejected(e.to_string()))?;

    tracing::info!(
        "Account created successfully! ID: {}, Email: {}, Role: {}",
        account.id,
        account.email,
        account.role
    );

    Ok(account.id.as_i32())
}

fn read_password() -> Result<String, CommandError> {
    #[allow(clippy::print_stderr)]
    {
        eprint!("Password: ");
    }
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
