//! Integration tests for the product URL store.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests
//! cargo test -p product-url-store-integration-tests
//!
//! # PostgreSQL tests (need a disposable database)
//! URL_STORE_TEST_DATABASE_URL=postgres://localhost/url_store_test \
//!     cargo test -p product-url-store-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `url_reconciliation` - Reconciler, hooks and fixtures on the in-memory backend
//! - `postgres_urls` - `PostgreSQL` backend, migrations and transactions

use product_url_store_core::{
    Locale, LocaleId, LocalizedAttributes, ProductAbstract, ProductAbstractId, Store, StoreId,
    URL_KEY_ATTRIBUTE,
};

/// Product fixture shared with the CLI.
pub const PRODUCT_YAML: &str = include_str!("../../cli/fixtures/product.yaml");

/// Catalog fixture shared with the CLI.
pub const CATALOG_YAML: &str = include_str!("../../cli/fixtures/catalog.yaml");

/// Environment variable naming the disposable test database.
pub const TEST_DATABASE_URL_VAR: &str = "URL_STORE_TEST_DATABASE_URL";

/// `de_DE` as seeded by the catalog fixture.
#[must_use]
pub fn de_de() -> Locale {
    Locale::new(LocaleId::new(46), "de_DE")
}

/// `en_US` as seeded by the catalog fixture.
#[must_use]
pub fn en_us() -> Locale {
    Locale::new(LocaleId::new(66), "en_US")
}

/// The catalog fixture's stores.
#[must_use]
pub fn catalog_stores() -> Vec<Store> {
    vec![
        Store::new(StoreId::new(1), "DE"),
        Store::new(StoreId::new(2), "AT"),
        Store::new(StoreId::new(3), "US"),
    ]
}

/// A saved product abstract with German and English URL keys.
#[must_use]
pub fn product(id: i32, stores: &[i32], de_key: &str, en_key: &str) -> ProductAbstract {
    ProductAbstract::new(format!("sku-{id}"))
        .with_id(ProductAbstractId::new(id))
        .with_store_relation(stores.iter().copied().map(StoreId::new).collect())
        .with_localized_attributes(
            LocalizedAttributes::new(de_de(), "Produkt").with_attribute(URL_KEY_ATTRIBUTE, de_key),
        )
        .with_localized_attributes(
            LocalizedAttributes::new(en_us(), "Product").with_attribute(URL_KEY_ATTRIBUTE, en_key),
        )
}

/// The test database URL, if configured.
#[must_use]
pub fn test_database_url() -> Option<String> {
    std::env::var(TEST_DATABASE_URL_VAR).ok()
}
