//! Product URL Store Core - Shared types library.
//!
//! This crate provides the types shared by every Product URL Store component:
//! - `url-store` - URL reconciliation, generators and storage backends
//! - `cli` - Command-line tools for migrations, seeding and reconciliation
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, locales, stores, product abstracts and URL records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
