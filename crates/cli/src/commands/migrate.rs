//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! url-store migrate
//! ```
//!
//! # Environment Variables
//!
//! - `URL_STORE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/url-store/migrations/` and are embedded into the
//! binary at build time.

use thiserror::Error;

use product_url_store::db::MIGRATOR;

use super::{CommandError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Connection or configuration failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), MigrationError> {
    let (_, pool) = connect().await?;

    tracing::info!("Running URL store migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("URL store migrations complete!");
    Ok(())
}
