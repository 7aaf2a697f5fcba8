//! Wire types for the store backend API.
//!
//! Every response carries a `success` flag. Lists and identities are
//! defaulted when absent so a `success: false` body with only a message
//! still decodes.

use serde::{Deserialize, Serialize};

use gaming_store_core::{LineItem, Price, ProductId, UserId, UserIdentity};

// =============================================================================
// Catalog
// =============================================================================

/// A product as returned by the games and accessories endpoints.
///
/// Only `id`, `name` and `price` are guaranteed; the remaining fields are
/// filled in by the reference backend and tolerated when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSource {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub platform: Vec<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub in_stock: Option<bool>,
}

/// `GET /products/games` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamesResponse {
    pub success: bool,
    #[serde(default)]
    pub games: Vec<ProductSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /products/accessories` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoriesResponse {
    pub success: bool,
    #[serde(default)]
    pub accessories: Vec<ProductSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Optional filters accepted by the games endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GameFilter {
    /// Case-insensitive category match (e.g. `action`, `rpg`).
    pub category: Option<String>,
    /// Exact platform match (e.g. `PS5`).
    pub platform: Option<String>,
}

impl GameFilter {
    /// Query pairs to append to the request URL.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("category", self.category.as_deref()),
            ("platform", self.platform.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// `POST /accounts/login` body.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// `POST /accounts/register` body.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .finish()
    }
}

/// Response of both account endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// Contact details copied from the signed-in user into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// `POST /orders` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub user_id: UserId,
    pub items: Vec<LineItem>,
    pub total: Price,
    pub customer_info: CustomerInfo,
}

/// Order record echoed back by the backend on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `POST /orders` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderRecord>,
}
