//! Gaming Store Core - Shared domain types.
//!
//! This crate provides the types shared by every gaming store component:
//! - `storefront` - Cart store, account session, catalog and API client
//! - `cli` - Command-line front end
//! - `integration-tests` - End-to-end tests against a mock backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, product types, line items, identities and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
