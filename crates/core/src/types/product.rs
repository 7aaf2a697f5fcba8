//! Product categories.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing an unknown product type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown product type: {0} (expected `game` or `accessory`)")]
pub struct ProductTypeError(String);

/// Category a product is sold under.
///
/// Product ids are only unique within a category, so a cart line is keyed by
/// the (`id`, `type`) pair rather than the id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Game,
    Accessory,
}

impl ProductType {
    /// Wire name of the product type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Accessory => "accessory",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = ProductTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "game" | "games" => Ok(Self::Game),
            "accessory" | "accessories" => Ok(Self::Accessory),
            _ => Err(ProductTypeError(s.to_owned())),
        }
    }
}
