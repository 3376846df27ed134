//! Product abstract input data.
//!
//! A product abstract is owned by the surrounding catalog. The URL store only
//! reads it: the ID and store assignment drive reconciliation, the SKU and
//! attributes feed URL generation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Locale, ProductAbstractId, StoreRelation};

/// Attribute key holding an explicit URL key, abstract or localized.
pub const URL_KEY_ATTRIBUTE: &str = "url_key";

/// Attributes of a product abstract for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedAttributes {
    /// Locale these attributes belong to.
    pub locale: Locale,
    /// Localized product name.
    #[serde(default)]
    pub name: String,
    /// Free-form localized attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl LocalizedAttributes {
    /// Create localized attributes with a name and no extra attributes.
    #[must_use]
    pub fn new(locale: Locale, name: impl Into<String>) -> Self {
        Self {
            locale,
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The localized `url_key` attribute, if set and not blank.
    #[must_use]
    pub fn url_key(&self) -> Option<&str> {
        non_blank(self.attributes.get(URL_KEY_ATTRIBUTE))
    }
}

/// A product abstract as handed over by the catalog after create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAbstract {
    /// Persisted identifier; `None` until the catalog has stored the product.
    #[serde(default)]
    pub id: Option<ProductAbstractId>,
    /// Abstract SKU.
    pub sku: String,
    /// Locale-independent attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Per-locale attributes; one entry per locale the product supports.
    #[serde(default)]
    pub localized_attributes: Vec<LocalizedAttributes>,
    /// Stores the product is assigned to.
    #[serde(default, rename = "stores")]
    pub store_relation: StoreRelation,
}

impl ProductAbstract {
    /// Create an unsaved product abstract with only a SKU.
    #[must_use]
    pub fn new(sku: impl Into<String>) -> Self {
        Self {
            id: None,
            sku: sku.into(),
            attributes: BTreeMap::new(),
            localized_attributes: Vec::new(),
            store_relation: StoreRelation::empty(),
        }
    }

    /// Set the persisted identifier, builder style.
    #[must_use]
    pub const fn with_id(mut self, id: ProductAbstractId) -> Self {
        self.id = Some(id);
        self
    }

    /// Replace the store assignment, builder style.
    #[must_use]
    pub fn with_store_relation(mut self, store_relation: StoreRelation) -> Self {
        self.store_relation = store_relation;
        self
    }

    /// Add an abstract attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a locale's attributes, builder style.
    #[must_use]
    pub fn with_localized_attributes(mut self, localized: LocalizedAttributes) -> Self {
        self.localized_attributes.push(localized);
        self
    }

    /// The abstract `url_key` attribute, if set and not blank.
    #[must_use]
    pub fn url_key(&self) -> Option<&str> {
        non_blank(self.attributes.get(URL_KEY_ATTRIBUTE))
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}
