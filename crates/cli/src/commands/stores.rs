//! Store catalog commands.

use product_url_store::db;

use super::{CommandError, connect, print_json};

/// Print every store as JSON.
///
/// # Errors
///
/// Returns `CommandError` if the database cannot be queried.
pub async fn list() -> Result<(), CommandError> {
    let (_, pool) = connect().await?;

    let stores = db::list_stores(&pool).await?;
    tracing::info!(count = stores.len(), "Loaded stores");

    print_json(&stores)
}
