//! Rocket Shoes CLI - cart management tools.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! rs-cli cart show
//!
//! # Add one unit of product 3 (checks stock)
//! rs-cli cart add 3
//!
//! # Set product 3 to an amount of 2 (checks stock)
//! rs-cli cart update 3 2
//!
//! # Remove product 3
//! rs-cli cart remove 3
//! ```
//!
//! The CLI reads the same environment as the storefront binary
//! (`CART_DATA_DIR`, `CATALOG_API_URL`, ...), so it operates on the same cart.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use rocket_shoes_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "rs-cli")]
#[command(author, version, about = "Rocket Shoes CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the amount of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New amount (zero or below is ignored)
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing; cart output is logged at info level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
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
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show().await?,
            CartAction::Add { product_id } => commands::cart::add(product_id).await?,
            CartAction::Remove { product_id } => commands::cart::remove(product_id).await?,
            CartAction::Update { product_id, amount } => {
                commands::cart::update(product_id, amount).await?;
            }
        },
    }
    Ok(())
}
