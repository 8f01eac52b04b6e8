//! Verdant CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! verdant-cli migrate
//!
//! # Seed the catalog with demo data
//! verdant-cli seed
//!
//! # Grant a user admin access
//! verdant-cli admin promote -e staff@verdant.shop
//!
//! # Revoke admin access
//! verdant-cli admin demote -e staff@verdant.shop
//! ```
//!
//! All commands read the database URL from `ADMIN_DATABASE_URL` (falling
//! back to `DATABASE_URL`), since migrations and role changes need the
//! service role.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "verdant-cli")]
#[command(author, version, about = "Verdant CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with demo categories and products
    Seed,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant a user admin access
    Promote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke a user's admin access
    Demote {
        /// User email address
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => {
                commands::admin::set_role(&email, verdant_core::UserRole::Admin).await?;
            }
            AdminAction::Demote { email } => {
                commands::admin::set_role(&email, verdant_core::UserRole::User).await?;
            }
        },
    }
    Ok(())
}
