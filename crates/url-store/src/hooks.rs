//! Product abstract lifecycle hooks.
//!
//! Product persistence runs a chain of hooks after saving an abstract. The
//! URL hooks reconcile URLs through a shared [`ProductUrlManager`] and hand
//! the product back unchanged for the next hook.

use std::sync::Arc;

use async_trait::async_trait;

use product_url_store_core::ProductAbstract;

use crate::catalog::StoreCatalog;
use crate::error::ReconcileError;
use crate::generator::UrlGenerator;
use crate::repository::UrlRepository;
use crate::services::ProductUrlManager;

/// A step run after a product abstract has been saved.
#[async_trait]
pub trait ProductAbstractHook: Send + Sync {
    /// Run the hook and return the (possibly enriched) product.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if the hook's work failed; the product is
    /// saved either way.
    async fn run(&self, product: ProductAbstract) -> Result<ProductAbstract, ReconcileError>;
}

/// Creates URLs for a newly saved product abstract.
pub struct UrlProductAbstractAfterCreateHook<G, C, R> {
    manager: Arc<ProductUrlManager<G, C, R>>,
}

impl<G, C, R> UrlProductAbstractAfterCreateHook<G, C, R> {
    /// Create the hook around a shared manager.
    #[must_use]
    pub const fn new(manager: Arc<ProductUrlManager<G, C, R>>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl<G, C, R> ProductAbstractHook for UrlProductAbstractAfterCreateHook<G, C, R>
where
    G: UrlGenerator,
    C: StoreCatalog,
    R: UrlRepository,
{
    async fn run(&self, product: ProductAbstract) -> Result<ProductAbstract, ReconcileError> {
        self.manager.create_product_url(&product).await?;
        Ok(product)
    }
}

/// Reconciles URLs of an updated product abstract.
pub struct UrlProductAbstractAfterUpdateHook<G, C, R> {
    manager: Arc<ProductUrlManager<G, C, R>>,
}

impl<G, C, R> UrlProductAbstractAfterUpdateHook<G, C, R> {
    /// Create the hook around a shared manager.
    #[must_use]
    pub const fn new(manager: Arc<ProductUrlManager<G, C, R>>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl<G, C, R> ProductAbstractHook for UrlProductAbstractAfterUpdateHook<G, C, R>
where
    G: UrlGenerator,
    C: StoreCatalog,
    R: UrlRepository,
{
    async fn run(&self, product: ProductAbstract) -> Result<ProductAbstract, ReconcileError> {
        self.manager.update_product_url(&product).await?;
        Ok(product)
    }
}
