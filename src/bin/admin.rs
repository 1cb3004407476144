//! CLI administration tool for shortlink.
//!
//! Talks to the database directly, so it works while the HTTP service is down.
//!
//! # Usage
//!
//! ```bash
//! # Register an account interactively
//! cargo run --bin admin -- account create
//!
//! # List accounts
//! cargo run --bin admin -- account list
//!
//! # Link and click totals
//! cargo run --bin admin -- stats
//!
//! # Inspect derived short codes
//! cargo run --bin admin -- code encode 42
//! cargo run --bin admin -- code decode Xb81kPq0
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required for account, stats and db commands)
//! - `BCRYPT_COST` (default 14, 4-31)
//! - `SHORT_CODE_ALPHABET`, `SHORT_CODE_MIN_LENGTH` (same defaults as the server)

use shortlink::config;
use shortlink::domain::entities::NewAccount;
use shortlink::domain::repositories::{AccountRepository, LinkRepository};
use shortlink::infrastructure::persistence::{PgAccountRepository, PgLinkRepository};
use shortlink::utils::code_generator::{DEFAULT_ALPHABET, DEFAULT_MIN_LENGTH, ShortCodeEncoder};
use shortlink::utils::password::hash_password;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;
use validator::ValidateEmail;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Show link and click totals
    Stats,

    /// Encode or decode derived short codes
    Code {
        #[command(subcommand)]
        action: CodeAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Register a new account
    Create {
        /// Account email (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all accounts
    List,
}

#[derive(Subcommand)]
enum CodeAction {
    /// Show the code a link id encodes to
    Encode {
        id: i64,

        /// Clash counter; 0 gives the canonical code
        #[arg(short, long, default_value_t = 0)]
        attempt: u32,
    },

    /// Show the numbers a code was built from
    Decode { code: String },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection and server version
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Code { action } = cli.command {
        return handle_code_action(action);
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Account { action } => handle_account_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        Commands::Code { .. } => unreachable!("handled before connecting"),
    }

    Ok(())
}

async fn handle_account_action(action: AccountAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgAccountRepository::new(Arc::new(pool.clone())));

    match action {
        AccountAction::Create { email, yes } => create_account(repo, email, yes).await,
        AccountAction::List => list_accounts(repo).await,
    }
}

/// Registers an account with the same rules as `POST /api/v1/signup`.
///
/// The account is created disabled.
async fn create_account(
    repo: Arc<PgAccountRepository>,
    email: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let cost = config::load_bcrypt_cost()?;

    println!("{}", "Create account".bright_blue().bold());
    println!();

    let email = match email {
        Some(e) => e,
        None => Input::<String>::new()
            .with_prompt("Email")
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.validate_email() {
                    Ok(())
                } else {
                    Err("invalid email")
                }
            })
            .interact_text()?,
    };

    if !email.validate_email() {
        anyhow::bail!("invalid email: {}", email);
    }

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    if repo
        .email_exists(&email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    {
        println!("{}", "Account already exists".yellow());
        return Ok(());
    }

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Create account {}?", email))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let password_hash = hash_password(&password, cost)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let account = repo
        .create(NewAccount {
            email,
            password_hash,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create account: {}", e))?;

    println!();
    println!(
        "{} {} (id {})",
        "✓ Account created:".green().bold(),
        account.email.cyan(),
        account.id.to_string().bright_black()
    );
    println!();

    Ok(())
}

/// Lists all accounts.
///
/// # Output Format
///
/// ```text
///   ID  Email                          Created              Enabled
///   ─────────────────────────────────────────────────────────────────
///   1   user@example.com               2025-01-15 10:30     no
/// ```
async fn list_accounts(repo: Arc<PgAccountRepository>) -> Result<()> {
    println!("{}", "Accounts".bright_blue().bold());
    println!();

    let accounts = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list accounts: {}", e))?;

    if accounts.is_empty() {
        println!("{}", "  No accounts found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<30} {:<20} {:<8}",
        "ID".bright_white().bold(),
        "Email".bright_white().bold(),
        "Created".bright_white().bold(),
        "Enabled".bright_white().bold()
    );
    println!("  {}", "─".repeat(65).bright_black());

    for account in &accounts {
        let enabled = if account.is_enabled {
            "yes".green()
        } else {
            "no".yellow()
        };

        println!(
            "  {:<4} {:<30} {:<20} {}",
            account.id.to_string().bright_black(),
            account.email.cyan(),
            account
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            enabled
        );
    }

    println!();
    println!(
        "  Total: {}",
        accounts.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let links = PgLinkRepository::new(Arc::new(pool.clone()));
    let totals = links
        .totals()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load totals: {}", e))?;

    let accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;

    println!(
        "  Accounts: {}",
        accounts.to_string().bright_green().bold()
    );
    println!(
        "  Links:    {}",
        totals.links.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:   {}",
        totals.clicks.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

fn handle_code_action(action: CodeAction) -> Result<()> {
    let alphabet =
        std::env::var("SHORT_CODE_ALPHABET").unwrap_or_else(|_| DEFAULT_ALPHABET.to_string());
    let min_length = std::env::var("SHORT_CODE_MIN_LENGTH")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MIN_LENGTH);
    let encoder = ShortCodeEncoder::new(&alphabet, min_length)
        .map_err(|e| anyhow::anyhow!("Invalid SHORT_CODE_ALPHABET: {}", e))?;

    match action {
        CodeAction::Encode { id, attempt } => {
            let code = encoder
                .encode(id, attempt)
                .map_err(|e| anyhow::anyhow!("Cannot encode {}: {}", id, e))?;
            println!("{}", code.bright_yellow().bold());
        }
        CodeAction::Decode { code } => match encoder.decode(&code) {
            Some(numbers) => println!("{}", format!("{:?}", numbers).bright_green()),
            None => println!("{}", "Not a derived code".yellow()),
        },
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "✓ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}
