//! Tradecart CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run order engine database migrations
//! tradecart migrate
//!
//! # Seed demo catalog data (includes a market-priced item)
//! tradecart seed
//!
//! # Create a customer account
//! tradecart account create -e buyer@example.com --approve
//!
//! # Approve an existing account
//! tradecart account approve -e buyer@example.com
//!
//! # Set an account's price multiplier
//! tradecart account set-multiplier -e buyer@example.com -m 1.25
//!
//! # Issue an API token for an account
//! tradecart token issue -e buyer@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog with demo items
//! - `account` - Create, approve, and configure accounts
//! - `token` - Issue API tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tradecart")]
#[command(author, version, about = "Tradecart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with demo items
    Seed,
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Approve the account immediately
        #[arg(long)]
        approve: bool,

        /// Grant the ADMIN role
        #[arg(long)]
        admin: bool,

        /// Price multiplier (default 1.0)
        #[arg(short, long)]
        multiplier: Option<String>,
    },
    /// Approve an existing account for checkout
    Approve {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Set an account's price multiplier
    SetMultiplier {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// New multiplier value
        #[arg(short, long)]
        multiplier: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a new API token for an account
    Issue {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::catalog().await?,
        Commands::Account { action } => match action {
            AccountAction::Create {
                email,
                approve,
                admin,
                multiplier,
            } => {
                commands::account::create(&email, approve, admin, multiplier.as_deref()).await?;
            }
            AccountAction::Approve { email } => commands::account::approve(&email).await?,
            AccountAction::SetMultiplier { email, multiplier } => {
                commands::account::set_multiplier(&email, &multiplier).await?;
            }
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { email } => {
                commands::token::issue(&email).await?;
            }
        },
    }
    Ok(())
}
