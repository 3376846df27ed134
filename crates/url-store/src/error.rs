//! Unified error handling for URL reconciliation.

use thiserror::Error;

use product_url_store_core::ProductAbstractId;

use crate::catalog::CatalogError;
use crate::generator::GenerationError;
use crate::repository::{RepositoryError, TransactionError};

/// Error returned by the reconciler entry points.
///
/// A failed call never leaves partial URL changes behind, so the whole
/// operation can be retried as is.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The product abstract has no persisted identifier. No transaction was
    /// started.
    #[error("product abstract has no identifier")]
    MissingIdentifier,

    /// Reconciliation started and was rolled back.
    #[error("URL reconciliation failed for product abstract {product_abstract_id}: {cause}")]
    Failed {
        /// Product abstract being reconciled.
        product_abstract_id: ProductAbstractId,
        /// What went wrong.
        #[source]
        cause: ReconcileFailure,
    },
}

impl ReconcileError {
    pub(crate) const fn failed(
        product_abstract_id: ProductAbstractId,
        cause: ReconcileFailure,
    ) -> Self {
        Self::Failed {
            product_abstract_id,
            cause,
        }
    }

    /// The product abstract the failure belongs to, if it had an identifier.
    #[must_use]
    pub const fn product_abstract_id(&self) -> Option<ProductAbstractId> {
        match self {
            Self::MissingIdentifier => None,
            Self::Failed {
                product_abstract_id,
                ..
            } => Some(*product_abstract_id),
        }
    }

    /// The underlying failure, if reconciliation got past the precondition.
    #[must_use]
    pub const fn failure(&self) -> Option<&ReconcileFailure> {
        match self {
            Self::MissingIdentifier => None,
            Self::Failed { cause, .. } => Some(cause),
        }
    }
}

/// Cause of a rolled back reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileFailure {
    /// The store catalog could not be read.
    #[error("store catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The URL generator rejected the product.
    #[error("URL generation error: {0}")]
    Generation(#[from] GenerationError),

    /// A URL repository operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Begin or commit failed.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),
}
