//! Client-side services.
//!
//! # Services
//!
//! - `cart` - Cart store, persistence and checkout
//! - `auth` - Account session (login, registration, logout)
//! - `catalog` - Product listing, search and lookup
//!
//! Each service talks to the backend through a trait (`OrderService`,
//! `AccountService`, `CatalogService`) implemented by
//! [`ApiClient`](crate::api::ApiClient).

pub mod auth;
pub mod cart;
pub mod catalog;

pub use auth::{AccountService, AccountSession, AuthError, RegistrationForm};
pub use cart::{CartState, CartStore, CartSummary, CheckoutError, OrderConfirmation, OrderService};
pub use catalog::{Catalog, CatalogError, CatalogService};
