//! Gaming Store storefront library.
//!
//! Client-side session logic for the gaming store: the product catalog,
//! the cart with its checkout protocol, and the signed-in account. UI
//! front ends (the `gs` CLI) drive a [`Storefront`](state::Storefront).
//!
//! # Architecture
//!
//! - [`api`] - JSON-over-HTTP client for the store backend
//! - [`services`] - cart, account session and catalog
//! - [`storage`] - durable key/value snapshots
//! - [`state`] - one session bundling the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

pub use state::Storefront;
