//! Store catalog queries.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use product_url_store_core::{Store, StoreId};

use super::map_write_error;
use crate::catalog::{CatalogError, StoreCatalog};
use crate::repository::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id_store: i32,
    name: String,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self::new(StoreId::new(row.id_store), row.name)
    }
}

/// All stores, ordered by ID.
///
/// # Errors
///
/// Returns `sqlx::Error` if the query fails.
pub async fn list_stores(pool: &PgPool) -> Result<Vec<Store>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StoreRow>(
        r"
        SELECT id_store, name
        FROM url_store.store
        ORDER BY id_store
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Store::from).collect())
}

/// Insert a store or rename the existing one with the same ID.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if another store already has the name.
pub async fn upsert_store(
    conn: &mut PgConnection,
    store: &Store,
) -> Result<Store, RepositoryError> {
    let row = sqlx::query_as::<_, StoreRow>(
        r"
        INSERT INTO url_store.store (id_store, name)
        VALUES ($1, $2)
        ON CONFLICT (id_store) DO UPDATE SET name = EXCLUDED.name
        RETURNING id_store, name
        ",
    )
    .bind(store.id)
    .bind(&store.name)
    .fetch_one(conn)
    .await
    .map_err(|e| map_write_error(e, "store name already taken"))?;

    Ok(row.into())
}

/// [`StoreCatalog`] over the `url_store.store` table.
#[derive(Debug, Clone)]
pub struct PgStoreCatalog {
    pool: PgPool,
}

impl PgStoreCatalog {
    /// Create a catalog reading from `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreCatalog for PgStoreCatalog {
    async fn all_stores(&self) -> Result<Vec<Store>, CatalogError> {
        Ok(list_stores(&self.pool).await?)
    }
}
