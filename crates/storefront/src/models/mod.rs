//! Domain models for storefront.

pub mod product;

pub use product::Product;
