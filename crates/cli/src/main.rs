//! Affiliate Ledger CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! al-cli migrate
//!
//! # Register a merchant
//! al-cli merchant create -d shop.example.com -n "Example Shop"
//!
//! # Replay an order payload through the ingestion pipeline
//! al-cli order ingest order.json
//!
//! # List recorded orders for a merchant
//! al-cli order list -d shop.example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `merchant create` - Register merchants
//! - `order ingest` / `order list` - Replay and inspect orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "al-cli")]
#[command(author, version, about = "Affiliate Ledger CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage merchants
    Merchant {
        #[command(subcommand)]
        action: MerchantAction,
    },
    /// Ingest and inspect orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum MerchantAction {
    /// Register a new merchant
    Create {
        /// Storefront domain orders will arrive from
        #[arg(short, long)]
        domain: String,

        /// Merchant display name
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Ingest an order payload from a JSON file
    Ingest {
        /// Path to the JSON payload
        file: PathBuf,
    },
    /// List recorded orders for a merchant
    List {
        /// Merchant storefront domain
        #[arg(short, long)]
        domain: String,
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
        Commands::Merchant { action } => match action {
            MerchantAction::Create { domain, name } => {
                commands::merchant::create(&domain, &name).await?;
            }
        },
        Commands::Order { action } => match action {
            OrderAction::Ingest { file } => commands::order::ingest(&file).await?,
            OrderAction::List { domain } => commands::order::list(&domain).await?,
        },
    }
    Ok(())
}
