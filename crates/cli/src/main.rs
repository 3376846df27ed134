//! Product URL store CLI - migrations, catalog seeding and URL reconciliation.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! url-store migrate
//!
//! # Load stores and locales
//! url-store seed --file crates/cli/fixtures/catalog.yaml
//!
//! # Reconcile URLs for a saved product abstract
//! url-store urls create --product crates/cli/fixtures/product.yaml
//! url-store urls update --product crates/cli/fixtures/product.yaml
//!
//! # Print generated URLs without touching the database
//! url-store urls preview --product crates/cli/fixtures/product.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Upsert stores and locales from YAML
//! - `stores list` - List known stores
//! - `urls` - Create, update, preview or show product URLs

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use product_url_store::config::LogFormat;
use product_url_store_core::ProductAbstractId;

mod commands;

#[derive(Parser)]
#[command(name = "url-store")]
#[command(author, version, about = "Product URL store tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Upsert stores and locales from a YAML catalog file
    Seed {
        /// Path to the catalog YAML file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Inspect stores
    Stores {
        #[command(subcommand)]
        action: StoresAction,
    },
    /// Manage product URLs
    Urls {
        #[command(subcommand)]
        action: UrlsAction,
    },
}

#[derive(Subcommand)]
enum StoresAction {
    /// List all stores
    List,
}

#[derive(Subcommand)]
enum UrlsAction {
    /// Create URLs for a product abstract that has none
    Create {
        /// Path to the product abstract YAML file
        #[arg(short, long)]
        product: PathBuf,
    },
    /// Reconcile URLs with the product's current stores
    Update {
        /// Path to the product abstract YAML file
        #[arg(short, long)]
        product: PathBuf,
    },
    /// Print the URLs a product would get, without storing them
    Preview {
        /// Path to the product abstract YAML file
        #[arg(short, long)]
        product: PathBuf,
    },
    /// Show stored URLs of a product abstract
    Show {
        /// Product abstract ID
        #[arg(long)]
        product_id: i32,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("product_url_store=info,url_store=info"));

    let format = LogFormat::from_env().unwrap_or_else(|e| {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("{e}, falling back to text logs");
        }
        LogFormat::Text
    });

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Stores { action } => match action {
            StoresAction::List => commands::stores::list().await?,
        },
        Commands::Urls { action } => match action {
            UrlsAction::Create { product } => commands::urls::create(&product).await?,
            UrlsAction::Update { product } => commands::urls::update(&product).await?,
            UrlsAction::Preview { product } => commands::urls::preview(&product).await?,
            UrlsAction::Show { product_id } => {
                commands::urls::show(ProductAbstractId::new(product_id)).await?;
            }
        },
    }
    Ok(())
}
