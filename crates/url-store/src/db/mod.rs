//! `PostgreSQL` backend for the URL store.
//!
//! # Schema: `url_store`
//!
//! ## Tables
//!
//! - `store` - Stores URLs can be published in
//! - `locale` - Locales URLs are generated for
//! - `url` - One URL per (product abstract, store, locale)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/url-store/migrations/`, embedded in
//! [`MIGRATOR`] and run via:
//! ```bash
//! cargo run -p product-url-store-cli -- migrate
//! ```

pub mod locales;
pub mod stores;
pub mod urls;

use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use product_url_store_core::{Locale, Store};

use crate::config::DatabaseConfig;
use crate::repository::RepositoryError;

pub use locales::{list_locales, upsert_locale};
pub use stores::{PgStoreCatalog, list_stores, upsert_store};
pub use urls::{PgUrlRepository, PgUrlTransaction};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(config.acquire_timeout)
        .connect(config.url.expose_secret())
        .await
}

/// Stores and locales to load into the catalog tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    /// Stores, by ID.
    #[serde(default)]
    pub stores: Vec<Store>,
    /// Locales, by ID.
    #[serde(default)]
    pub locales: Vec<Locale>,
}

/// Upsert every store and locale of `seed` in one transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if a name is already used by another
/// ID, `RepositoryError::Database` for any other failure. Nothing is written
/// on error.
#[instrument(skip_all, fields(stores = seed.stores.len(), locales = seed.locales.len()))]
pub async fn seed_catalog(pool: &PgPool, seed: &CatalogSeed) -> Result<(), RepositoryError> {
    let mut tx = pool.begin().await?;

    for store in &seed.stores {
        upsert_store(&mut *tx, store).await?;
    }
    for locale in &seed.locales {
        upsert_locale(&mut *tx, locale).await?;
    }

    tx.commit().await?;
    tracing::info!("Catalog seeded");
    Ok(())
}

/// Map constraint violations to `Conflict`, everything else to `Database`.
pub(crate) fn map_write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(format!("{what}: {}", db_err.message()));
    }
    RepositoryError::Database(e)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use product_url_store_core::{LocaleId, StoreId};

    use super::*;

    #[test]
    fn test_catalog_seed_parses_from_yaml() {
        let yaml = r"
stores:
  - id: 1
    name: DE
  - id: 3
    name: US
locales:
  - id: 46
    name: de_DE
";

        let seed: CatalogSeed = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(seed.stores.len(), 2);
        assert_eq!(seed.stores[1].id, StoreId::new(3));
        assert_eq!(seed.stores[1].name, "US");
        assert_eq!(seed.locales, vec![Locale::new(LocaleId::new(46), "de_DE")]);
    }

    #[test]
    fn test_catalog_seed_sections_are_optional() {
        let seed: CatalogSeed = serde_yaml::from_str("stores: []").unwrap();
        assert!(seed.stores.is_empty());
        assert!(seed.locales.is_empty());
    }

    #[test]
    fn test_non_constraint_errors_stay_database_errors() {
        let err = map_write_error(sqlx::Error::RowNotFound, "url");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
