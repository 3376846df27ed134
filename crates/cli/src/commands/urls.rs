//! Product URL commands.
//!
//! # Usage
//!
//! ```bash
//! url-store urls create --product product.yaml
//! url-store urls update --product product.yaml
//! url-store urls preview --product product.yaml
//! url-store urls show --product-id 42
//! ```
//!
//! The product file is a serialized `ProductAbstract`; see
//! `crates/cli/fixtures/product.yaml`.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use product_url_store::config::generator_options_from_env;
use product_url_store::db::{PgStoreCatalog, PgUrlRepository};
use product_url_store::memory::{InMemoryStoreCatalog, InMemoryUrlRepository};
use product_url_store::{
    GeneratorOptions, ProductUrlManager, ReconcileError, RepositoryError, SlugUrlGenerator,
};
use product_url_store_core::{ProductAbstract, ProductAbstractId, ProductUrl, UrlRecord};

use super::{CommandError, connect, print_json, read_yaml};

/// Errors that can occur in URL commands.
#[derive(Debug, Error)]
pub enum UrlsError {
    /// Connection, configuration, file or output failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Reconciliation failed and was rolled back.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Stored URLs could not be read.
    #[error("Failed to load URLs: {0}")]
    Repository(#[from] RepositoryError),
}

type PgProductUrlManager = ProductUrlManager<SlugUrlGenerator, PgStoreCatalog, PgUrlRepository>;

/// What `preview` prints: the generator output and the records it maps to.
#[derive(Debug, Serialize)]
struct UrlPreview {
    product_url: ProductUrl,
    records: Vec<UrlRecord>,
}

async fn manager() -> Result<PgProductUrlManager, CommandError> {
    let (config, pool) = connect().await?;

    Ok(ProductUrlManager::new(
        SlugUrlGenerator::new(config.generator),
        PgStoreCatalog::new(pool.clone()),
        PgUrlRepository::new(pool),
    ))
}

/// Create URLs for the product in `product_path`.
///
/// # Errors
///
/// Returns `UrlsError` if the file is invalid or reconciliation fails.
pub async fn create(product_path: &Path) -> Result<(), UrlsError> {
    let product: ProductAbstract = read_yaml(product_path).await?;
    let manager = manager().await?;

    let product_url = manager.create_product_url(&product).await?;
    info!(sku = %product.sku, urls = product_url.urls.len(), "Created product URLs");

    print_json(&product_url)?;
    Ok(())
}

/// Reconcile URLs for the product in `product_path`.
///
/// # Errors
///
/// Returns `UrlsError` if the file is invalid or reconciliation fails.
pub async fn update(product_path: &Path) -> Result<(), UrlsError> {
    let product: ProductAbstract = read_yaml(product_path).await?;
    let manager = manager().await?;

    let product_url = manager.update_product_url(&product).await?;
    info!(sku = %product.sku, urls = product_url.urls.len(), "Updated product URLs");

    print_json(&product_url)?;
    Ok(())
}

/// Print the URLs the product in `product_path` would get.
///
/// Needs no database; generator options still come from the environment.
///
/// # Errors
///
/// Returns `UrlsError` if the file is invalid or reconciliation fails.
pub async fn preview(product_path: &Path) -> Result<(), UrlsError> {
    let product: ProductAbstract = read_yaml(product_path).await?;
    let options = generator_options_from_env().map_err(CommandError::from)?;

    print_json(&plan(options, &product).await?)?;
    Ok(())
}

/// Print the stored URLs of a product abstract.
///
/// # Errors
///
/// Returns `UrlsError` if the database cannot be queried.
pub async fn show(product_abstract_id: ProductAbstractId) -> Result<(), UrlsError> {
    let (_, pool) = connect().await?;

    let urls = PgUrlRepository::new(pool)
        .list_for_product(product_abstract_id)
        .await?;
    info!(%product_abstract_id, count = urls.len(), "Loaded product URLs");

    print_json(&urls)?;
    Ok(())
}

/// Run the create path against an empty in-memory backend.
///
/// Returned records carry no ID.
async fn plan(
    options: GeneratorOptions,
    product: &ProductAbstract,
) -> Result<UrlPreview, ReconcileError> {
    let repository = InMemoryUrlRepository::new();
    let manager = ProductUrlManager::new(
        SlugUrlGenerator::new(options),
        InMemoryStoreCatalog::default(),
        repository.clone(),
    );

    let product_url = manager.create_product_url(product).await?;
    let records = repository
        .urls()
        .into_iter()
        .map(|mut record| {
            record.id = None;
            record
        })
        .collect();

    Ok(UrlPreview {
        product_url,
        records,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use product_url_store_core::{Locale, LocaleId, LocalizedAttributes, StoreId};

    use super::*;

    fn product() -> ProductAbstract {
        ProductAbstract::new("bag-001")
            .with_id(ProductAbstractId::new(7))
            .with_store_relation([StoreId::new(1), StoreId::new(2)].into_iter().collect())
            .with_localized_attributes(LocalizedAttributes::new(
                Locale::new(LocaleId::new(1), "de_DE"),
                "Tasche",
            ))
            .with_localized_attributes(LocalizedAttributes::new(
                Locale::new(LocaleId::new(2), "en_US"),
                "Bag",
            ))
    }

    #[tokio::test]
    async fn test_plan_fans_out_over_stores() {
        let preview = plan(GeneratorOptions::default(), &product()).await.unwrap();

        let summary: Vec<_> = preview
            .records
            .iter()
            .map(|r| (r.store_id.as_i32(), r.locale_id.as_i32(), r.url.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, 1, "/de/tasche-7"),
                (1, 2, "/en/bag-7"),
                (2, 1, "/de/tasche-7"),
                (2, 2, "/en/bag-7"),
            ]
        );
        assert!(preview.records.iter().all(|r| !r.is_persisted()));
        assert_eq!(preview.product_url.urls.len(), 2);
    }

    #[tokio::test]
    async fn test_plan_needs_an_identifier() {
        let mut product = product();
        product.id = None;

        let err = plan(GeneratorOptions::default(), &product)
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::MissingIdentifier));
    }
}
