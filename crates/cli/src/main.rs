//! ForgePilot CLI - admin credential and content tools.
//!
//! # Usage
//!
//! ```bash
//! # Set the admin credential (password from FORGEPILOT_ADMIN_PASSWORD if omitted)
//! fp-cli admin set --email admin@agency.ai --password 's3cure-pass'
//!
//! # Show the configured admin email
//! fp-cli admin show
//!
//! # Try a login against the stored credential without starting the site
//! fp-cli admin check --email admin@agency.ai --password 's3cure-pass'
//!
//! # Print a bcrypt hash
//! fp-cli hash --password 's3cure-pass' --cost 12
//!
//! # Insert the built-in landing content into empty tables
//! fp-cli seed
//! ```
//!
//! Commands that touch data read `BACKEND_URL`, `BACKEND_ANON_KEY` and
//! `BACKEND_SERVICE_KEY` like the site does.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use forgepilot_site::config::DEFAULT_BCRYPT_COST;

mod commands;

#[derive(Parser)]
#[command(name = "fp-cli")]
#[command(author, version, about = "ForgePilot CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the admin credential
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Print a bcrypt hash of a password
    Hash {
        #[arg(short, long)]
        password: String,

        /// bcrypt cost factor
        #[arg(short, long, default_value_t = DEFAULT_BCRYPT_COST)]
        cost: u32,
    },
    /// Insert the built-in landing content into empty tables
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Hash a password and store it with the admin email
    Set {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FORGEPILOT_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        /// bcrypt cost factor
        #[arg(short, long, env = "BCRYPT_COST", default_value_t = DEFAULT_BCRYPT_COST)]
        cost: u32,
    },
    /// Print the configured admin email
    Show,
    /// Run the login check against the stored credential
    Check {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Use the legacy password policy
        #[arg(long)]
        legacy: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fp_cli=info,forgepilot_backend=warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Set {
                email,
                password,
                cost,
            } => commands::admin::set(&email, &password, cost).await?,
            AdminAction::Show => commands::admin::show().await?,
            AdminAction::Check {
                email,
                password,
                legacy,
            } => commands::admin::check(&email, &password, legacy).await?,
        },
        Commands::Hash { password, cost } => commands::admin::hash(&password, cost)?,
        Commands::Seed => commands::seed::landing().await?,
    }
    Ok(())
}
