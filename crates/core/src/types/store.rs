//! Stores and a product's store assignment.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::StoreId;

/// Errors that can occur when building a [`StoreRelation`] from a list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreRelationError {
    /// The same store appears more than once in the assignment.
    #[error("store {0} is assigned more than once")]
    DuplicateStore(StoreId),
}

/// A store (sales channel) from the store catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Store {
    /// Catalog identifier.
    pub id: StoreId,
    /// Store name, e.g. `DE`.
    pub name: String,
}

impl Store {
    /// Create a store from its ID and name.
    #[must_use]
    pub fn new(id: StoreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The set of stores a product abstract is assigned to.
///
/// Backed by an ordered set so that every store is reconciled exactly once
/// and in a stable order. Deserializing from a list with repeated IDs fails
/// with [`StoreRelationError::DuplicateStore`] instead of silently collapsing
/// the repeats, so an upstream bug in the assignment surfaces early.
///
/// ```
/// use product_url_store_core::{StoreId, StoreRelation};
///
/// let relation = StoreRelation::try_from(vec![StoreId::new(2), StoreId::new(1)]).unwrap();
/// assert_eq!(relation.iter().collect::<Vec<_>>(), vec![StoreId::new(1), StoreId::new(2)]);
///
/// assert!(StoreRelation::try_from(vec![StoreId::new(1), StoreId::new(1)]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StoreId>", into = "Vec<StoreId>")]
pub struct StoreRelation {
    id_stores: BTreeSet<StoreId>,
}

impl StoreRelation {
    /// An empty assignment (the product is in no store).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            id_stores: BTreeSet::new(),
        }
    }

    /// Returns `true` if the product is assigned to `store_id`.
    #[must_use]
    pub fn contains(&self, store_id: StoreId) -> bool {
        self.id_stores.contains(&store_id)
    }

    /// Iterate assigned store IDs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.id_stores.iter().copied()
    }

    /// Number of assigned stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.id_stores.len()
    }

    /// Returns `true` if no store is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_stores.is_empty()
    }
}

impl FromIterator<StoreId> for StoreRelation {
    fn from_iter<I: IntoIterator<Item = StoreId>>(iter: I) -> Self {
        Self {
            id_stores: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<Vec<StoreId>> for StoreRelation {
    type Error = StoreRelationError;

    fn try_from(ids: Vec<StoreId>) -> Result<Self, Self::Error> {
        let mut id_stores = BTreeSet::new();
        for id in ids {
            if !id_stores.insert(id) {
                return Err(StoreRelationError::DuplicateStore(id));
            }
        }
        Ok(Self { id_stores })
    }
}

impl From<StoreRelation> for Vec<StoreId> {
    fn from(relation: StoreRelation) -> Self {
        relation.id_stores.into_iter().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_iter_collapses_repeats() {
        let relation: StoreRelation = [StoreId::new(1), StoreId::new(1)].into_iter().collect();
        assert_eq!(relation.len(), 1);
    }

    #[test]
    fn test_try_from_rejects_duplicates() {
        let result =
            StoreRelation::try_from(vec![StoreId::new(1), StoreId::new(2), StoreId::new(1)]);
        assert_eq!(result, Err(StoreRelationError::DuplicateStore(StoreId::new(1))));
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let result: Result<StoreRelation, _> = serde_json::from_str("[1, 1]");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("store 1 is assigned more than once"));
    }

    #[test]
    fn test_serde_as_list() {
        let relation: StoreRelation = serde_json::from_str("[3, 1]").unwrap();
        assert!(relation.contains(StoreId::new(1)));
        assert!(relation.contains(StoreId::new(3)));
        assert!(!relation.contains(StoreId::new(2)));
        assert_eq!(serde_json::to_string(&relation).unwrap(), "[1,3]");
    }

    #[test]
    fn test_empty() {
        let relation = StoreRelation::empty();
        assert!(relation.is_empty());
        assert_eq!(relation.iter().count(), 0);
    }
}
