//! Core types for the gaming store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod identity;
pub mod line_item;
pub mod price;
pub mod product;

pub use email::{Email, EmailError};
pub use id::*;
pub use identity::UserIdentity;
pub use line_item::LineItem;
pub use price::Price;
pub use product::{ProductType, ProductTypeError};
