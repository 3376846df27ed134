//! Seed the store and locale catalog from YAML.
//!
//! ```yaml
//! stores:
//!   - id: 1
//!     name: DE
//! locales:
//!   - id: 46
//!     name: de_DE
//! ```

use std::path::Path;

use thiserror::Error;
use tracing::info;

use product_url_store::RepositoryError;
use product_url_store::db::{self, CatalogSeed};

use super::{CommandError, connect, read_yaml};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Connection, configuration or file failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The catalog could not be written.
    #[error("Seeding failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// Upsert the stores and locales listed in `file_path`.
///
/// # Errors
///
/// Returns `SeedError` if the file is unreadable or invalid, or the
/// database rejects the catalog.
pub async fn catalog(file_path: &Path) -> Result<(), SeedError> {
    // Parse before connecting so a bad file fails fast
    let seed: CatalogSeed = read_yaml(file_path).await?;
    info!(
        path = %file_path.display(),
        stores = seed.stores.len(),
        locales = seed.locales.len(),
        "Parsed catalog"
    );

    let (_, pool) = connect().await?;
    db::seed_catalog(&pool, &seed).await?;

    Ok(())
}
