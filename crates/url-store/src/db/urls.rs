//! URL record queries.
//!
//! All reads and writes of the reconciler run on one database transaction
//! held by [`PgUrlTransaction`]. Dropping the handle without committing rolls
//! the transaction back.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use product_url_store_core::{LocaleId, ProductAbstractId, StoreId, UrlId, UrlKey, UrlRecord};

use super::map_write_error;
use crate::repository::{RepositoryError, TransactionError, UrlRepository, UrlTransaction};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UrlRow {
    id_url: i32,
    url: String,
    fk_locale: i32,
    fk_store: i32,
    fk_resource_product_abstract: i32,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        let key = UrlKey::new(
            ProductAbstractId::new(row.fk_resource_product_abstract),
            StoreId::new(row.fk_store),
            LocaleId::new(row.fk_locale),
        );
        let mut record = Self::new(key, row.url);
        record.id = Some(UrlId::new(row.id_url));
        record
    }
}

// =============================================================================
// Repository
// =============================================================================

/// [`UrlRepository`] over the `url_store.url` table.
#[derive(Debug, Clone)]
pub struct PgUrlRepository {
    pool: PgPool,
}

impl PgUrlRepository {
    /// Create a repository on `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every committed URL of a product abstract, ordered by store and locale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_abstract_id: ProductAbstractId,
    ) -> Result<Vec<UrlRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, UrlRow>(
            r"
            SELECT id_url, url, fk_locale, fk_store, fk_resource_product_abstract
            FROM url_store.url
            WHERE fk_resource_product_abstract = $1
            ORDER BY fk_store, fk_locale
            ",
        )
        .bind(product_abstract_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    type Transaction = PgUrlTransaction;

    async fn begin(&self) -> Result<Self::Transaction, TransactionError> {
        let tx = self.pool.begin().await.map_err(TransactionError::Begin)?;
        Ok(PgUrlTransaction { tx })
    }
}

/// An open database transaction over URL records.
pub struct PgUrlTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UrlTransaction for PgUrlTransaction {
    #[instrument(skip_all, fields(key = ?url.key()))]
    async fn create_url(&mut self, url: &UrlRecord) -> Result<UrlRecord, RepositoryError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r"
            INSERT INTO url_store.url (url, fk_locale, fk_store, fk_resource_product_abstract)
            VALUES ($1, $2, $3, $4)
            RETURNING id_url, url, fk_locale, fk_store, fk_resource_product_abstract
            ",
        )
        .bind(&url.url)
        .bind(url.locale_id)
        .bind(url.store_id)
        .bind(url.product_abstract_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, "URL already exists or references unknown store/locale"))?;

        Ok(row.into())
    }

    #[instrument(skip_all, fields(id = ?url.id))]
    async fn update_url(&mut self, url: &UrlRecord) -> Result<UrlRecord, RepositoryError> {
        let id = url.id.ok_or(RepositoryError::NotFound)?;

        let row = sqlx::query_as::<_, UrlRow>(
            r"
            UPDATE url_store.url
            SET url = $2,
                fk_locale = $3,
                fk_store = $4,
                fk_resource_product_abstract = $5,
                updated_at = NOW()
            WHERE id_url = $1
            RETURNING id_url, url, fk_locale, fk_store, fk_resource_product_abstract
            ",
        )
        .bind(id)
        .bind(&url.url)
        .bind(url.locale_id)
        .bind(url.store_id)
        .bind(url.product_abstract_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_error(e, "URL key already taken or references unknown store/locale")
        })?;

        row.map(UrlRecord::from).ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip_all, fields(id = ?url.id))]
    async fn delete_url(&mut self, url: &UrlRecord) -> Result<(), RepositoryError> {
        let id = url.id.ok_or(RepositoryError::NotFound)?;

        let result = sqlx::query(
            r"
            DELETE FROM url_store.url
            WHERE id_url = $1
            ",
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_url(&mut self, key: &UrlKey) -> Result<Option<UrlRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r"
            SELECT id_url, url, fk_locale, fk_store, fk_resource_product_abstract
            FROM url_store.url
            WHERE fk_resource_product_abstract = $1
              AND fk_store = $2
              AND fk_locale = $3
            ",
        )
        .bind(key.product_abstract_id)
        .bind(key.store_id)
        .bind(key.locale_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn commit(self) -> Result<(), TransactionError> {
        self.tx.commit().await.map_err(TransactionError::Commit)
    }

    async fn rollback(self) -> Result<(), TransactionError> {
        self.tx.rollback().await.map_err(TransactionError::Rollback)
    }
}
