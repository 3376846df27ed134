//! Generated and persisted product URLs.

use serde::{Deserialize, Serialize};

use super::{Locale, LocaleId, ProductAbstractId, StoreId, UrlId};

/// One generated URL for one locale. Not persisted directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalizedUrl {
    /// Locale the URL was generated for.
    pub locale: Locale,
    /// Generated URL path, e.g. `/de/tasche-1`.
    pub url: String,
}

impl LocalizedUrl {
    /// Create a localized URL.
    #[must_use]
    pub fn new(locale: Locale, url: impl Into<String>) -> Self {
        Self {
            locale,
            url: url.into(),
        }
    }
}

/// The full generator output for a product abstract: one URL per locale.
///
/// Store independent; the reconciler fans it out over the assigned stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUrl {
    /// SKU of the product abstract the URLs belong to.
    pub abstract_sku: String,
    /// Generated URLs in generator order.
    pub urls: Vec<LocalizedUrl>,
}

impl ProductUrl {
    /// Create an empty URL set for a SKU.
    #[must_use]
    pub fn new(abstract_sku: impl Into<String>) -> Self {
        Self {
            abstract_sku: abstract_sku.into(),
            urls: Vec::new(),
        }
    }

    /// Append a localized URL.
    pub fn add_url(&mut self, url: LocalizedUrl) {
        self.urls.push(url);
    }

    /// Look up the generated URL for a locale.
    #[must_use]
    pub fn url_for_locale(&self, locale_id: LocaleId) -> Option<&str> {
        self.urls
            .iter()
            .find(|u| u.locale.id == locale_id)
            .map(|u| u.url.as_str())
    }
}

/// Natural key of a URL record: at most one record per (product, store, locale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UrlKey {
    /// Owning product abstract.
    pub product_abstract_id: ProductAbstractId,
    /// Store the URL is published in.
    pub store_id: StoreId,
    /// Locale of the URL.
    pub locale_id: LocaleId,
}

impl UrlKey {
    /// Create a natural key.
    #[must_use]
    pub const fn new(
        product_abstract_id: ProductAbstractId,
        store_id: StoreId,
        locale_id: LocaleId,
    ) -> Self {
        Self {
            product_abstract_id,
            store_id,
            locale_id,
        }
    }
}

/// A store-aware product URL as stored by a URL repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UrlRecord {
    /// Persisted identifier; `None` for records not yet created.
    pub id: Option<UrlId>,
    /// URL path.
    pub url: String,
    /// Locale foreign key.
    pub locale_id: LocaleId,
    /// Store foreign key.
    pub store_id: StoreId,
    /// Owning product abstract.
    pub product_abstract_id: ProductAbstractId,
}

impl UrlRecord {
    /// Build an unsaved record for a natural key and URL.
    #[must_use]
    pub fn new(key: UrlKey, url: impl Into<String>) -> Self {
        Self {
            id: None,
            url: url.into(),
            locale_id: key.locale_id,
            store_id: key.store_id,
            product_abstract_id: key.product_abstract_id,
        }
    }

    /// An unsaved record with an empty URL, as returned by find-or-create
    /// when nothing is stored under `key`.
    #[must_use]
    pub fn placeholder(key: UrlKey) -> Self {
        Self::new(key, String::new())
    }

    /// The natural key of this record.
    #[must_use]
    pub const fn key(&self) -> UrlKey {
        UrlKey::new(self.product_abstract_id, self.store_id, self.locale_id)
    }

    /// Returns `true` if the record carries a persisted identifier.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Point the record at `key` with a new URL, keeping its identifier.
    pub fn assign(&mut self, key: UrlKey, url: impl Into<String>) {
        self.url = url.into();
        self.locale_id = key.locale_id;
        self.store_id = key.store_id;
        self.product_abstract_id = key.product_abstract_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> UrlKey {
        UrlKey::new(ProductAbstractId::new(1), StoreId::new(2), LocaleId::new(3))
    }

    #[test]
    fn test_placeholder_is_unsaved_and_empty() {
        let record = UrlRecord::placeholder(key());
        assert!(!record.is_persisted());
        assert!(record.url.is_empty());
        assert_eq!(record.key(), key());
    }

    #[test]
    fn test_assign_keeps_identifier() {
        let mut record = UrlRecord::new(key(), "/de/old-1");
        record.id = Some(UrlId::new(9));

        let other = UrlKey::new(ProductAbstractId::new(1), StoreId::new(4), LocaleId::new(3));
        record.assign(other, "/de/new-1");

        assert_eq!(record.id, Some(UrlId::new(9)));
        assert_eq!(record.url, "/de/new-1");
        assert_eq!(record.key(), other);
    }

    #[test]
    fn test_url_for_locale() {
        let mut product_url = ProductUrl::new("sku-1");
        product_url.add_url(LocalizedUrl::new(
            Locale::new(LocaleId::new(1), "de_DE"),
            "product-url-de",
        ));

        assert_eq!(product_url.url_for_locale(LocaleId::new(1)), Some("product-url-de"));
        assert_eq!(product_url.url_for_locale(LocaleId::new(2)), None);
    }
}
