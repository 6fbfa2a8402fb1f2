//! CLI administration tool for linkward.
//!
//! Provides commands for generating secrets, managing accounts, viewing
//! statistics, and performing database operations without HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Generate a JWT_SECRET value
//! cargo run --bin admin -- key
//!
//! # Issue an API key for an account
//! cargo run --bin admin -- user api-key a@example.com
//!
//! # Mark an account verified without the mailed link
//! cargo run --bin admin -- user verify a@example.com
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required except for `key`): PostgreSQL connection string
//! - `JWT_SECRET` (required for `user`): same secret the server runs with
//!
//! # Features
//!
//! - **Secret Generation**: Hex-encoded signing secrets
//! - **Account Tools**: API key issue and manual verification
//! - **Statistics**: User and link counts
//! - **Database Tools**: Connection checks and info queries
//! - **Interactive Prompts**: Confirmation dialogs (skippable with `--yes`)
//! - **Colored Output**: Terminal-friendly formatting using `colored` crate

use linkward::application::services::AccountService;
use linkward::application::services::account_service::derive_api_key_secret;
use linkward::config::Config;
use linkward::domain::clock::SystemClock;
use linkward::infrastructure::persistence::PgUserRepository;
use linkward::utils::id_generator::random_bytes;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// Length in bytes of a generated signing secret.
const SECRET_BYTES: usize = 32;

/// CLI tool for managing linkward.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Print a fresh hex-encoded secret suitable for JWT_SECRET
    Key,

    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Account management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Issue a new API key, replacing any existing one
    ApiKey {
        /// Account email
        email: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Mark an account verified
    Verify {
        /// Account email
        email: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Key = cli.command {
        let secret = random_bytes(SECRET_BYTES)?;
        println!("{}", hex::encode(secret));
        return Ok(());
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Key => {}
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Builds an [`AccountService`] over the given pool.
///
/// API key digests are keyed with a secret derived from `JWT_SECRET`, so the
/// tool must run with the server's secret for issued keys to be recognised.
fn account_service(pool: &PgPool) -> Result<AccountService> {
    let config = Config::from_env()?;
    let secret = derive_api_key_secret(&config.jwt_secret_bytes()?)?;

    Ok(AccountService::new(
        Arc::new(PgUserRepository::new(Arc::new(pool.clone()))),
        Arc::new(SystemClock),
        chrono::Duration::minutes(config.verification_ttl_minutes),
        secret,
    ))
}

/// Dispatches account management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let accounts = account_service(pool)?;

    match action {
        UserAction::ApiKey { email, yes } => issue_api_key(&accounts, &email, yes).await?,
        UserAction::Verify { email } => verify_user(&accounts, &email).await?,
    }

    Ok(())
}

/// Issues an API key with a confirmation prompt.
///
/// # Security
///
/// - Only the HMAC-SHA256 digest is stored in the database
/// - The raw key is displayed once and cannot be retrieved later
async fn issue_api_key(accounts: &AccountService, email: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "Issue API key".bright_blue().bold());
    println!();

    let user = accounts
        .get_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to find account: {}", e))?;

    println!("  Account: {}", user.email.cyan());
    println!("  ID:      {}", user.id.to_string().bright_black());
    if user.api_key.is_some() {
        println!(
            "{}",
            "  This account already has a key; it will stop working.".yellow()
        );
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Issue a new key?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let key = accounts
        .issue_api_key(user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to issue key: {}", e))?;

    println!();
    println!("{}", "Key issued.".green().bold());
    println!("  Key: {}", key.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this key now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    Ok(())
}

/// Marks an account verified, bypassing the mailed link.
async fn verify_user(accounts: &AccountService, email: &str) -> Result<()> {
    let user = accounts
        .get_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to find account: {}", e))?;

    if user.verified {
        println!("{}", "Account is already verified".yellow());
        return Ok(());
    }

    let changed = accounts
        .set_verified(user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to verify account: {}", e))?;

    if changed {
        println!("{} {}", "Verified".green().bold(), user.email.cyan());
    } else {
        println!("{}", "Account was verified concurrently".yellow());
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of users
/// - Number of verified users
/// - Total number of short links
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let verified_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE verified")
        .fetch_one(pool)
        .await?;

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;

    println!(
        "  Users:          {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Verified users: {}",
        verified_count.to_string().bright_green().bold()
    );
    println!(
        "  Short links:    {}",
        links_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
