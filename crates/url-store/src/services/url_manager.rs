//! Store-aware product URL reconciliation.
//!
//! The manager fans the generator's per-locale URLs out over a product's
//! assigned stores:
//! 1. `create_product_url` writes one new record per (store, locale)
//! 2. `update_product_url` updates or creates the records of assigned stores,
//!    then deletes records left in stores the product is no longer assigned to
//!
//! Each call runs in one transaction from the [`UrlRepository`]; on any error
//! the transaction is rolled back and nothing changes.

use tracing::{Span, debug, info, instrument, warn};

use product_url_store_core::{
    ProductAbstract, ProductAbstractId, ProductUrl, Store, StoreId, UrlKey, UrlRecord,
};

use crate::catalog::StoreCatalog;
use crate::error::{ReconcileError, ReconcileFailure};
use crate::generator::UrlGenerator;
use crate::repository::{UrlRepository, UrlTransaction};

/// Counts of record writes made by one reconciliation.
#[derive(Debug, Default, Clone, Copy)]
struct UrlChanges {
    created: usize,
    updated: usize,
    deleted: usize,
}

/// Reconciles persisted product URLs with a product abstract's stores.
pub struct ProductUrlManager<G, C, R> {
    generator: G,
    store_catalog: C,
    url_repository: R,
}

impl<G, C, R> ProductUrlManager<G, C, R>
where
    G: UrlGenerator,
    C: StoreCatalog,
    R: UrlRepository,
{
    /// Create a new manager from its collaborators.
    #[must_use]
    pub const fn new(generator: G, store_catalog: C, url_repository: R) -> Self {
        Self {
            generator,
            store_catalog,
            url_repository,
        }
    }

    /// The URL generator in use.
    #[must_use]
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// The URL repository in use.
    #[must_use]
    pub const fn url_repository(&self) -> &R {
        &self.url_repository
    }

    /// Create URLs for a product abstract that has none yet.
    ///
    /// Writes one record per assigned store and generated locale without
    /// reading first. Returns the generator output, not the per-store records.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::MissingIdentifier`] if the product has no ID,
    /// and [`ReconcileError::Failed`] (after rolling back) if generation or any
    /// repository call fails, including when a URL already exists for one of
    /// the natural keys.
    #[instrument(skip_all, fields(sku = %product.sku, product_abstract_id = tracing::field::Empty))]
    pub async fn create_product_url(
        &self,
        product: &ProductAbstract,
    ) -> Result<ProductUrl, ReconcileError> {
        let product_abstract_id = product.id.ok_or(ReconcileError::MissingIdentifier)?;
        Span::current().record("product_abstract_id", product_abstract_id.as_i32());

        let (product_url, changes) = self
            .create_in_transaction(product_abstract_id, product)
            .await
            .map_err(|cause| ReconcileError::failed(product_abstract_id, cause))?;

        info!(
            stores = product.store_relation.len(),
            locales = product_url.urls.len(),
            created = changes.created,
            "Product URLs created"
        );

        Ok(product_url)
    }

    /// Bring the URLs of a product abstract in line with its current stores.
    ///
    /// Assigned stores get a record per generated locale, updated in place
    /// when one exists. Records in catalog stores that are not assigned are
    /// deleted for every generated locale. Returns the generator output.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::MissingIdentifier`] if the product has no ID,
    /// and [`ReconcileError::Failed`] (after rolling back) if the catalog,
    /// generation or any repository call fails.
    #[instrument(skip_all, fields(sku = %product.sku, product_abstract_id = tracing::field::Empty))]
    pub async fn update_product_url(
        &self,
        product: &ProductAbstract,
    ) -> Result<ProductUrl, ReconcileError> {
        let product_abstract_id = product.id.ok_or(ReconcileError::MissingIdentifier)?;
        Span::current().record("product_abstract_id", product_abstract_id.as_i32());

        let (product_url, changes) = self
            .update_in_transaction(product_abstract_id, product)
            .await
            .map_err(|cause| ReconcileError::failed(product_abstract_id, cause))?;

        info!(
            stores = product.store_relation.len(),
            locales = product_url.urls.len(),
            created = changes.created,
            updated = changes.updated,
            deleted = changes.deleted,
            "Product URLs updated"
        );

        Ok(product_url)
    }

    async fn create_in_transaction(
        &self,
        product_abstract_id: ProductAbstractId,
        product: &ProductAbstract,
    ) -> Result<(ProductUrl, UrlChanges), ReconcileFailure> {
        let mut tx = self.url_repository.begin().await?;
        let outcome = self.create_urls(&mut tx, product_abstract_id, product).await;
        finish(tx, outcome).await
    }

    async fn update_in_transaction(
        &self,
        product_abstract_id: ProductAbstractId,
        product: &ProductAbstract,
    ) -> Result<(ProductUrl, UrlChanges), ReconcileFailure> {
        let available_stores = self.store_catalog.all_stores().await?;

        let mut tx = self.url_repository.begin().await?;
        let outcome = self
            .update_urls(&mut tx, product_abstract_id, product, available_stores)
            .await;
        finish(tx, outcome).await
    }

    async fn create_urls(
        &self,
        tx: &mut R::Transaction,
        product_abstract_id: ProductAbstractId,
        product: &ProductAbstract,
    ) -> Result<(ProductUrl, UrlChanges), ReconcileFailure> {
        let product_url = self.generator.generate_product_url(product)?;
        let mut changes = UrlChanges::default();

        for store_id in product.store_relation.iter() {
            for localized_url in &product_url.urls {
                let key = UrlKey::new(product_abstract_id, store_id, localized_url.locale.id);
                let created = tx
                    .create_url(&UrlRecord::new(key, localized_url.url.clone()))
                    .await?;
                changes.created += 1;
                debug!(
                    url_id = ?created.id,
                    %store_id,
                    locale = %localized_url.locale,
                    url = %created.url,
                    "Created product URL"
                );
            }
        }

        Ok((product_url, changes))
    }

    async fn update_urls(
        &self,
        tx: &mut R::Transaction,
        product_abstract_id: ProductAbstractId,
        product: &ProductAbstract,
        mut available_stores: Vec<Store>,
    ) -> Result<(ProductUrl, UrlChanges), ReconcileFailure> {
        let product_url = self.generator.generate_product_url(product)?;
        let mut changes = UrlChanges::default();

        for store_id in product.store_relation.iter() {
            remove_store(&mut available_stores, store_id);

            for localized_url in &product_url.urls {
                let key = UrlKey::new(product_abstract_id, store_id, localized_url.locale.id);
                let mut record = tx.find_or_create_url(&key).await?;
                record.assign(key, localized_url.url.clone());

                if record.is_persisted() {
                    tx.update_url(&record).await?;
                    changes.updated += 1;
                    debug!(
                        url_id = ?record.id,
                        %store_id,
                        locale = %localized_url.locale,
                        url = %record.url,
                        "Updated product URL"
                    );
                } else {
                    let created = tx.create_url(&record).await?;
                    changes.created += 1;
                    debug!(
                        url_id = ?created.id,
                        %store_id,
                        locale = %localized_url.locale,
                        url = %created.url,
                        "Created product URL"
                    );
                }
            }
        }

        // Whatever is left of the catalog is not assigned to the product.
        changes.deleted = clear_orphaned_urls(
            tx,
            product_abstract_id,
            &available_stores,
            &product_url,
        )
        .await?;

        Ok((product_url, changes))
    }
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged, not returned; dropping the handle discards
/// the changes.
async fn finish<T, X>(
    tx: X,
    outcome: Result<T, ReconcileFailure>,
) -> Result<T, ReconcileFailure>
where
    X: UrlTransaction,
{
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(failure) => {
            if let Err(e) = tx.rollback().await {
                warn!(error = %e, "Rollback failed");
            }
            debug!(error = %failure, "Rolled back product URL changes");
            Err(failure)
        }
    }
}

/// Remove the first store with `store_id`; catalog IDs are unique.
fn remove_store(stores: &mut Vec<Store>, store_id: StoreId) {
    if let Some(index) = stores.iter().position(|store| store.id == store_id) {
        stores.remove(index);
    }
}

async fn clear_orphaned_urls<X>(
    tx: &mut X,
    product_abstract_id: ProductAbstractId,
    orphan_stores: &[Store],
    product_url: &ProductUrl,
) -> Result<usize, ReconcileFailure>
where
    X: UrlTransaction,
{
    let mut deleted = 0;

    for store in orphan_stores {
        for localized_url in &product_url.urls {
            let key = UrlKey::new(product_abstract_id, store.id, localized_url.locale.id);
            let Some(record) = tx.find_url(&key).await? else {
                continue;
            };

            if record.is_persisted() && record.store_id == store.id {
                tx.delete_url(&record).await?;
                deleted += 1;
                debug!(
                    url_id = ?record.id,
                    store = %store.name,
                    locale = %localized_url.locale,
                    url = %record.url,
                    "Deleted orphaned product URL"
                );
            }
        }
    }

    Ok(deleted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use product_url_store_core::{
        Locale, LocaleId, LocalizedAttributes, LocalizedUrl, StoreRelation, URL_KEY_ATTRIBUTE,
    };

    use super::*;
    use crate::generator::GenerationError;
    use crate::memory::{InMemoryStoreCatalog, InMemoryUrlRepository, UrlOperation};
    use crate::repository::RepositoryError;
    use crate::{CatalogError, TransactionError};

    /// Generator that uses each localized `url_key` verbatim.
    fn url_key_generator(product: &ProductAbstract) -> Result<ProductUrl, GenerationError> {
        let mut product_url = ProductUrl::new(product.sku.clone());
        for localized in &product.localized_attributes {
            product_url.add_url(LocalizedUrl::new(
                localized.locale.clone(),
                localized.url_key().unwrap_or_default(),
            ));
        }
        Ok(product_url)
    }

    fn failing_generator(_: &ProductAbstract) -> Result<ProductUrl, GenerationError> {
        Err(GenerationError::MissingIdentifier)
    }

    fn de() -> Locale {
        Locale::new(LocaleId::new(1), "de_DE")
    }

    fn en() -> Locale {
        Locale::new(LocaleId::new(2), "en_US")
    }

    fn stores(ids: &[i32]) -> StoreRelation {
        ids.iter().copied().map(StoreId::new).collect()
    }

    fn catalog(ids: &[i32]) -> InMemoryStoreCatalog {
        InMemoryStoreCatalog::new(
            ids.iter()
                .map(|id| Store::new(StoreId::new(*id), format!("store-{id}")))
                .collect(),
        )
    }

    fn product(store_ids: &[i32], de_url: &str, en_url: &str) -> ProductAbstract {
        ProductAbstract::new("product-test")
            .with_id(ProductAbstractId::new(1))
            .with_store_relation(stores(store_ids))
            .with_localized_attributes(
                LocalizedAttributes::new(de(), "Produkt").with_attribute(URL_KEY_ATTRIBUTE, de_url),
            )
            .with_localized_attributes(
                LocalizedAttributes::new(en(), "Product").with_attribute(URL_KEY_ATTRIBUTE, en_url),
            )
    }

    fn manager(
        catalog_ids: &[i32],
        repository: &InMemoryUrlRepository,
    ) -> ProductUrlManager<impl UrlGenerator, InMemoryStoreCatalog, InMemoryUrlRepository> {
        ProductUrlManager::new(url_key_generator, catalog(catalog_ids), repository.clone())
    }

    fn tuples(repository: &InMemoryUrlRepository) -> Vec<(i32, i32, String)> {
        repository
            .urls()
            .into_iter()
            .map(|u| (u.store_id.as_i32(), u.locale_id.as_i32(), u.url))
            .collect()
    }

    #[tokio::test]
    async fn test_create_writes_one_record_per_store_and_locale() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1, 2, 3], &repository);

        let product_url = manager
            .create_product_url(&product(&[1, 3], "product-url-de", "product-url-en"))
            .await
            .unwrap();

        assert_eq!(product_url.urls.len(), 2);
        assert_eq!(
            tuples(&repository),
            vec![
                (1, 1, "product-url-de".to_string()),
                (1, 2, "product-url-en".to_string()),
                (3, 1, "product-url-de".to_string()),
                (3, 2, "product-url-en".to_string()),
            ]
        );
        assert!(
            repository
                .urls()
                .iter()
                .all(|u| u.product_abstract_id == ProductAbstractId::new(1) && u.is_persisted())
        );
    }

    #[tokio::test]
    async fn test_create_returns_generator_output() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1], &repository);
        let product = product(&[1], "product-url-de", "product-url-en");

        let product_url = manager.create_product_url(&product).await.unwrap();

        assert_eq!(product_url, url_key_generator(&product).unwrap());
    }

    #[tokio::test]
    async fn test_create_without_stores_writes_nothing() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1], &repository);

        let product_url = manager
            .create_product_url(&product(&[], "product-url-de", "product-url-en"))
            .await
            .unwrap();

        assert_eq!(product_url.urls.len(), 2);
        assert!(repository.urls().is_empty());
        assert_eq!(repository.commits(), 1);
    }

    #[tokio::test]
    async fn test_missing_identifier_starts_no_transaction() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1], &repository);
        let mut product = product(&[1], "product-url-de", "product-url-en");
        product.id = None;

        let create = manager.create_product_url(&product).await;
        let update = manager.update_product_url(&product).await;

        assert!(matches!(create, Err(ReconcileError::MissingIdentifier)));
        assert!(matches!(update, Err(ReconcileError::MissingIdentifier)));
        assert_eq!(repository.transactions_started(), 0);
    }

    #[tokio::test]
    async fn test_create_replay_conflicts_and_keeps_first_set() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1], &repository);
        let product = product(&[1], "product-url-de", "product-url-en");

        manager.create_product_url(&product).await.unwrap();
        let before = repository.urls();

        let err = manager.create_product_url(&product).await.unwrap_err();

        assert!(matches!(
            err.failure(),
            Some(ReconcileFailure::Repository(RepositoryError::Conflict(_)))
        ));
        assert_eq!(repository.urls(), before);
        assert_eq!(repository.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_update_creates_missing_records() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1], &repository);

        manager
            .update_product_url(&product(&[1], "product-url-de", "product-url-en"))
            .await
            .unwrap();

        assert_eq!(
            tuples(&repository),
            vec![
                (1, 1, "product-url-de".to_string()),
                (1, 2, "product-url-en".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_converges_to_new_store_set() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1, 2, 3], &repository);

        manager
            .create_product_url(&product(&[1, 2], "alt-de", "alt-en"))
            .await
            .unwrap();
        let kept_ids: Vec<_> = repository
            .urls()
            .into_iter()
            .filter(|u| u.store_id == StoreId::new(2))
            .map(|u| u.id)
            .collect();

        manager
            .update_product_url(&product(&[2, 3], "neu-de", "new-en"))
            .await
            .unwrap();

        assert_eq!(
            tuples(&repository),
            vec![
                (2, 1, "neu-de".to_string()),
                (2, 2, "new-en".to_string()),
                (3, 1, "neu-de".to_string()),
                (3, 2, "new-en".to_string()),
            ]
        );

        // Records of the store kept across both calls are updated in place.
        let updated_ids: Vec<_> = repository
            .urls()
            .into_iter()
            .filter(|u| u.store_id == StoreId::new(2))
            .map(|u| u.id)
            .collect();
        assert_eq!(updated_ids, kept_ids);
    }

    #[tokio::test]
    async fn test_update_is_idempotent_for_unchanged_input() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1, 2], &repository);
        let product = product(&[1, 2], "product-url-de", "product-url-en");

        manager.create_product_url(&product).await.unwrap();
        let before = repository.urls();

        manager.update_product_url(&product).await.unwrap();
        manager.update_product_url(&product).await.unwrap();

        assert_eq!(repository.urls(), before);
    }

    #[tokio::test]
    async fn test_concrete_create_scenario() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1], &repository);

        manager
            .create_product_url(&product(&[1], "product-url-de", "product-url-en"))
            .await
            .unwrap();

        let urls = repository.urls();
        assert_eq!(urls.len(), 2);
        assert_eq!(
            (urls[0].store_id, urls[0].locale_id, urls[0].url.as_str()),
            (StoreId::new(1), LocaleId::new(1), "product-url-de")
        );
        assert_eq!(
            (urls[1].store_id, urls[1].locale_id, urls[1].url.as_str()),
            (StoreId::new(1), LocaleId::new(2), "product-url-en")
        );
    }

    #[tokio::test]
    async fn test_concrete_unassign_scenario() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1], &repository);

        manager
            .create_product_url(&product(&[1], "product-url-de", "product-url-en"))
            .await
            .unwrap();
        repository.clear_operations();

        manager
            .update_product_url(&product(&[], "product-url-de", "product-url-en"))
            .await
            .unwrap();

        assert!(repository.urls().is_empty());
        let operations = repository.operations();
        assert_eq!(operations.len(), 2);
        assert!(
            operations
                .iter()
                .all(|op| matches!(op, UrlOperation::Delete(_)))
        );
    }

    #[tokio::test]
    async fn test_never_assigned_store_causes_no_deletes() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1, 9], &repository);

        manager
            .update_product_url(&product(&[1], "product-url-de", "product-url-en"))
            .await
            .unwrap();

        assert!(
            !repository
                .operations()
                .iter()
                .any(|op| matches!(op, UrlOperation::Delete(_)))
        );
    }

    #[tokio::test]
    async fn test_orphan_cleanup_leaves_other_products_alone() {
        let repository = InMemoryUrlRepository::new();
        let other = UrlRecord::new(
            UrlKey::new(ProductAbstractId::new(2), StoreId::new(2), LocaleId::new(1)),
            "other-product",
        );
        repository.seed(other).unwrap();
        let manager = manager(&[1, 2], &repository);

        manager
            .update_product_url(&product(&[1], "product-url-de", "product-url-en"))
            .await
            .unwrap();

        assert!(
            repository
                .urls()
                .iter()
                .any(|u| u.product_abstract_id == ProductAbstractId::new(2))
        );
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_everything() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1, 2, 3], &repository);

        manager
            .create_product_url(&product(&[1, 2], "alt-de", "alt-en"))
            .await
            .unwrap();
        let before = repository.urls();

        // Both updates for store 2 and the first create for store 3 go through.
        repository.fail_after_writes(3);
        let err = manager
            .update_product_url(&product(&[2, 3], "neu-de", "new-en"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.failure(),
            Some(ReconcileFailure::Repository(RepositoryError::Unavailable(_)))
        ));
        assert_eq!(err.product_abstract_id(), Some(ProductAbstractId::new(1)));
        assert_eq!(repository.urls(), before);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_changes() {
        let repository = InMemoryUrlRepository::new();
        let manager = manager(&[1], &repository);

        repository.fail_next_commit();
        let err = manager
            .create_product_url(&product(&[1], "product-url-de", "product-url-en"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.failure(),
            Some(ReconcileFailure::Transaction(TransactionError::Unavailable(_)))
        ));
        assert!(repository.urls().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_rolls_back() {
        let repository = InMemoryUrlRepository::new();
        let manager = ProductUrlManager::new(failing_generator, catalog(&[1]), repository.clone());

        let err = manager
            .update_product_url(&product(&[1], "product-url-de", "product-url-en"))
            .await
            .unwrap_err();

        assert!(matches!(err.failure(), Some(ReconcileFailure::Generation(_))));
        assert_eq!(repository.transactions_started(), 1);
        assert_eq!(repository.rollbacks(), 1);
        assert!(repository.operations().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_starts_no_transaction() {
        let repository = InMemoryUrlRepository::new();
        let manager = ProductUrlManager::new(
            url_key_generator,
            InMemoryStoreCatalog::unavailable(),
            repository.clone(),
        );

        let err = manager
            .update_product_url(&product(&[1], "product-url-de", "product-url-en"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.failure(),
            Some(ReconcileFailure::Catalog(CatalogError::Unavailable(_)))
        ));
        assert_eq!(repository.transactions_started(), 0);
    }

    #[test]
    fn test_remove_store_removes_first_match_only() {
        let mut stores = vec![
            Store::new(StoreId::new(1), "a"),
            Store::new(StoreId::new(2), "b"),
            Store::new(StoreId::new(1), "c"),
        ];

        remove_store(&mut stores, StoreId::new(1));
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].name, "b");
        assert_eq!(stores[1].name, "c");

        remove_store(&mut stores, StoreId::new(5));
        assert_eq!(stores.len(), 2);
    }
}
