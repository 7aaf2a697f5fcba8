//! Command implementations.
//!
//! Each command runs against an already-opened [`Storefront`] and prints its
//! result to stdout. Errors are returned for `main` to report.
//!
//! [`Storefront`]: gaming_store_storefront::Storefront

pub mod account;
pub mod cart;
pub mod catalog;
