//! Business logic services for the URL store.
//!
//! # Services
//!
//! - `url_manager` - Store-aware product URL reconciliation

pub mod url_manager;

pub use url_manager::ProductUrlManager;
