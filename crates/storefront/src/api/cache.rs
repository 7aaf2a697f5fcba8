//! Cache types for catalog responses.

use super::types::{AccessoriesResponse, GameFilter, GamesResponse};

/// Cache key for product lists.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Games(GameFilter),
    Accessories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Games(GamesResponse),
    Accessories(AccessoriesResponse),
}
