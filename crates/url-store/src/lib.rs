//! Product URL Store library.
//!
//! Keeps store-aware product URLs consistent with a product abstract's
//! store assignment: one URL per (store, locale), created, updated in place
//! or removed inside a single transaction.
//!
//! # Modules
//!
//! - [`services`] - The [`ProductUrlManager`] reconciler
//! - [`generator`] - URL generation seam and the slug-based default
//! - [`repository`] - URL repository and transaction seams
//! - [`catalog`] - Store catalog seam
//! - [`db`] - `PostgreSQL` backend and migrations
//! - [`memory`] - In-process backend for tests and previews
//! - [`hooks`] - Adapters for product abstract create/update events
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod hooks;
pub mod memory;
pub mod repository;
pub mod services;

pub use catalog::{CatalogError, StoreCatalog};
pub use error::{ReconcileError, ReconcileFailure};
pub use generator::{GenerationError, GeneratorOptions, SlugUrlGenerator, UrlGenerator};
pub use repository::{RepositoryError, TransactionError, UrlRepository, UrlTransaction};
pub use services::ProductUrlManager;
