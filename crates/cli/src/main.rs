//! Newsdesk CLI - Database migrations and account bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! newsdesk migrate
//!
//! # Create a persisted account (prompts for the password)
//! newsdesk account create -e editor@example.com -n "Desk Editor" -r staff
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `account create` - Create accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(author, version, about = "Newsdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage persisted accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account display name
        #[arg(short, long)]
        name: String,

        /// Role name or code (`viewer`/0, `staff`/1, `lecturer`/2, `admin`/3)
        #[arg(short, long, default_value = "staff")]
        role: String,

        /// Password; read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Account { action } => match action {
            AccountAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::account::create(&email, &name, &role, password).await?;
            }
        },
    }
    Ok(())
}
