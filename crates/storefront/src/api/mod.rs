//! Store backend API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; every endpoint answers with a
//!   `success` flag and an optional `message`
//! - The backend is source of truth for products and orders - the client
//!   keeps only the cart and signed-in user locally
//! - In-memory caching via `moka` for product lists (TTL from configuration)
//!
//! # Endpoints
//!
//! - `GET /products/games` and `GET /products/accessories` - catalog
//! - `POST /accounts/login` and `POST /accounts/register` - accounts
//! - `POST /orders` - checkout
//!
//! # Example
//!
//! ```rust,ignore
//! use gaming_store_storefront::api::{ApiClient, GameFilter};
//!
//! let client = ApiClient::new(&config)?;
//! let games = client.games(&GameFilter::default()).await?;
//! ```

mod cache;
pub mod types;

pub use types::*;

use std::sync::Arc;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use crate::config::StorefrontConfig;

use cache::{CacheKey, CacheValue};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Errors that can occur when talking to the store backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// How a non-success HTTP status is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorBody {
    /// Any non-2xx status is a transport failure.
    Reject,
    /// 4xx bodies shaped like the success type are returned to the caller,
    /// which inspects their `success` flag. The account endpoints answer a
    /// wrong password with `401 {"success": false, "message": ...}`.
    DecodeClientErrors,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the store backend API.
///
/// Cheap to clone; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                cache,
            }),
        })
    }

    /// Root URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an endpoint path below the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode its JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        error_body: ErrorBody,
    ) -> Result<T, ApiError> {
        let request_id = Uuid::new_v4();

        let response = request
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            if error_body == ErrorBody::DecodeClientErrors
                && status.is_client_error()
                && let Ok(decoded) = serde_json::from_str::<T>(&body)
            {
                debug!(%request_id, %status, "Decoded client error body");
                return Ok(decoded);
            }

            tracing::error!(
                %request_id,
                status = %status,
                body = %truncate(&body, 500),
                "Store API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                %request_id,
                error = %e,
                body = %truncate(&body, 500),
                "Failed to parse store API response"
            );
            ApiError::Parse(e)
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, error_body: ErrorBody) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.send(self.inner.client.post(url).json(body), error_body)
            .await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List games, optionally filtered by category and platform.
    ///
    /// Successful responses are cached per filter.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status or decoding failures.
    #[instrument(skip(self))]
    pub async fn games(&self, filter: &GameFilter) -> Result<GamesResponse, ApiError> {
        let key = CacheKey::Games(filter.clone());
        if let Some(CacheValue::Games(cached)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for games");
            return Ok(cached);
        }

        let mut url = self.endpoint("products/games")?;
        let pairs: Vec<_> = filter.query_pairs().collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let response: GamesResponse = self
            .send(self.inner.client.get(url), ErrorBody::Reject)
            .await?;

        if response.success {
            self.inner
                .cache
                .insert(key, CacheValue::Games(response.clone()))
                .await;
        }

        Ok(response)
    }

    /// List accessories.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status or decoding failures.
    #[instrument(skip(self))]
    pub async fn accessories(&self) -> Result<AccessoriesResponse, ApiError> {
        if let Some(CacheValue::Accessories(cached)) =
            self.inner.cache.get(&CacheKey::Accessories).await
        {
            debug!("Cache hit for accessories");
            return Ok(cached);
        }

        let url = self.endpoint("products/accessories")?;
        let response: AccessoriesResponse = self
            .send(self.inner.client.get(url), ErrorBody::Reject)
            .await?;

        if response.success {
            self.inner
                .cache
                .insert(
                    CacheKey::Accessories,
                    CacheValue::Accessories(response.clone()),
                )
                .await;
        }

        Ok(response)
    }

    /// Drop all cached product lists.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// A rejected login comes back as `Ok` with `success: false`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status or decoding failures.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AccountResponse, ApiError> {
        self.post_json("accounts/login", request, ErrorBody::DecodeClientErrors)
            .await
    }

    /// Create an account.
    ///
    /// A rejected registration comes back as `Ok` with `success: false`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status or decoding failures.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AccountResponse, ApiError> {
        self.post_json("accounts/register", request, ErrorBody::DecodeClientErrors)
            .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order. A single attempt; never retried.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status or decoding failures,
    /// including any non-2xx status.
    #[instrument(skip(self, order), fields(user_id = %order.user_id, items = order.items.len(), total = %order.total))]
    pub async fn submit_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError> {
        self.post_json("orders", order, ErrorBody::Reject).await
    }
}

/// First `max` characters of `s`.
fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
