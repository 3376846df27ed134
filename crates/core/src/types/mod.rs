//! Core types for Product URL Store.
//!
//! This module provides type-safe wrappers for the catalog and URL domain.

pub mod id;
pub mod locale;
pub mod product;
pub mod store;
pub mod url;

pub use id::*;
pub use locale::Locale;
pub use product::{LocalizedAttributes, ProductAbstract, URL_KEY_ATTRIBUTE};
pub use store::{Store, StoreRelation, StoreRelationError};
pub use url::{LocalizedUrl, ProductUrl, UrlKey, UrlRecord};
