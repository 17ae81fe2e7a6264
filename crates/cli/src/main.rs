//! Bistro CLI: drive a local cart, browse the catalog and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! bistro products --category 3
//! bistro categories
//!
//! # Build a cart (stored under --data-dir, default $BISTRO_DATA_DIR or .bistro)
//! bistro cart add 12 --quantity 2 --with Coalhada=1
//! bistro cart show
//!
//! # Place and track an order
//! bistro checkout --delivery delivery --payment cash --address "Rua A, 1" --change-for 100
//! bistro order 981
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and edit the local cart
//! - `products`, `categories` - List the catalog
//! - `checkout` - Submit the cart as an order
//! - `order` - Track an order

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use bistro_core::{DeliveryMethod, PaymentMethod};
use bistro_storefront::config::data_dir_from_env;
use bistro_storefront::services::checkout::CheckoutDetails;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "bistro")]
#[command(author, version, about = "Bistro ordering CLI")]
struct Cli {
    /// Directory holding the cart snapshot
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and edit the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List products
    Products {
        /// Only list products of this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List categories
    Categories,
    /// Submit the cart as an order
    Checkout {
        /// `delivery` or `pickup`
        #[arg(short, long)]
        delivery: DeliveryMethod,

        /// `pix`, `card` or `cash`
        #[arg(short, long)]
        payment: PaymentMethod,

        /// Delivery address (required for delivery)
        #[arg(short, long)]
        address: Option<String>,

        /// Cash amount to give change for
        #[arg(long)]
        change_for: Option<Decimal>,
    },
    /// Track an order
    Order {
        /// Order ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add a product from the catalog
    Add {
        /// Product ID
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Free-text instructions for this line
        #[arg(short, long)]
        notes: Option<String>,

        /// Accompaniment selection as NAME=QTY (repeatable)
        #[arg(short, long = "with", value_parser = commands::cart::parse_selection)]
        with: Vec<(String, u32)>,
    },
    /// Set a line's quantity (0 removes it)
    Update {
        /// Product ID
        product_id: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Product ID
        product_id: String,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

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
    let data_dir = cli.data_dir.unwrap_or_else(data_dir_from_env);

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&data_dir),
            CartAction::Add {
                product_id,
                quantity,
                notes,
                with,
            } => {
                let selection = commands::cart::collect_selection(with)?;
                commands::cart::add(&data_dir, &product_id, quantity, notes, &selection).await?;
            }
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&data_dir, &product_id, quantity),
            CartAction::Remove { product_id } => commands::cart::remove(&data_dir, &product_id),
            CartAction::Clear => commands::cart::clear(&data_dir),
        },
        Commands::Products { category } => commands::catalog::products(category).await?,
        Commands::Categories => commands::catalog::categories().await?,
        Commands::Checkout {
            delivery,
            payment,
            address,
            change_for,
        } => {
            let details = CheckoutDetails {
                delivery_method: delivery,
                payment_method: payment,
                address,
                change_for,
            };
            commands::orders::checkout(&data_dir, &details).await?;
        }
        Commands::Order { id } => commands::orders::track(&id).await?,
    }
    Ok(())
}
