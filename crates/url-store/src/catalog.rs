//! Store catalog seam.

use async_trait::async_trait;
use thiserror::Error;

use product_url_store_core::Store;

/// Errors that can occur while reading the store catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A non-database catalog could not be read.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to every store known to the platform.
#[async_trait]
pub trait StoreCatalog: Send + Sync {
    /// All known stores, each identifier at most once, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the catalog cannot be read.
    async fn all_stores(&self) -> Result<Vec<Store>, CatalogError>;
}
