//! URL repository and transaction seams.
//!
//! A [`UrlRepository`] hands out [`UrlTransaction`] handles. Every read and
//! write of URL records goes through a handle, and a handle ends exactly once:
//! by [`UrlTransaction::commit`], by [`UrlTransaction::rollback`], or by being
//! dropped, which must discard its changes.

use async_trait::async_trait;
use thiserror::Error;

use product_url_store_core::{UrlKey, UrlRecord};

/// Errors that can occur during URL repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The record to update or delete does not exist.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., natural key already taken).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A non-database backend refused the operation.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors at transaction boundaries.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The transaction could not be started.
    #[error("failed to begin transaction: {0}")]
    Begin(#[source] sqlx::Error),

    /// The transaction could not be committed; nothing was applied.
    #[error("failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),

    /// A concurrent commit changed the records this transaction wrote;
    /// nothing was applied.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// An explicit rollback failed.
    #[error("failed to roll back transaction: {0}")]
    Rollback(#[source] sqlx::Error),

    /// A non-database backend refused the operation.
    #[error("transaction backend unavailable: {0}")]
    Unavailable(String),
}

/// Source of transactions over persisted URL records.
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Transaction handle type.
    type Transaction: UrlTransaction;

    /// Start a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Begin`] if no transaction can be opened.
    async fn begin(&self) -> Result<Self::Transaction, TransactionError>;
}

/// URL record operations scoped to one open transaction.
///
/// Changes made through a handle are invisible to other transactions until
/// [`commit`](Self::commit) succeeds.
#[async_trait]
pub trait UrlTransaction: Send {
    /// Persist a new record and return it with its assigned ID.
    ///
    /// Any ID already set on `url` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if a record already exists for
    /// the same natural key.
    async fn create_url(&mut self, url: &UrlRecord) -> Result<UrlRecord, RepositoryError>;

    /// Overwrite the URL, store, locale and product of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if `url` has no ID or its ID is
    /// not stored, [`RepositoryError::Conflict`] if the new natural key is
    /// taken by another record.
    async fn update_url(&mut self, url: &UrlRecord) -> Result<UrlRecord, RepositoryError>;

    /// Remove a persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if `url` has no ID or its ID is
    /// not stored.
    async fn delete_url(&mut self, url: &UrlRecord) -> Result<(), RepositoryError>;

    /// Exact lookup by natural key.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the lookup itself fails; a missing
    /// record is `Ok(None)`.
    async fn find_url(&mut self, key: &UrlKey) -> Result<Option<UrlRecord>, RepositoryError>;

    /// Lookup by natural key that never reports "not found".
    ///
    /// When nothing is stored under `key`, this materializes an unsaved
    /// [`UrlRecord::placeholder`] (no ID, empty URL) instead of failing.
    /// Nothing is written; callers tell a stored record from a placeholder by
    /// [`UrlRecord::is_persisted`] and must create the placeholder themselves
    /// if they want it stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the lookup itself fails.
    async fn find_or_create_url(&mut self, key: &UrlKey) -> Result<UrlRecord, RepositoryError> {
        Ok(self
            .find_url(key)
            .await?
            .unwrap_or_else(|| UrlRecord::placeholder(*key)))
    }

    /// Make every change of this transaction visible.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Commit`] if the backend refuses; in that
    /// case no change is applied.
    async fn commit(self) -> Result<(), TransactionError>;

    /// Discard every change of this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Rollback`] if the backend reports a
    /// failure while discarding.
    async fn rollback(self) -> Result<(), TransactionError>;
}
