//! Session state shared by UI code.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::instrument;

use gaming_store_core::{ProductId, ProductType, UserIdentity};

use crate::api::{ApiClient, ApiError, GameFilter};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::services::{
    AccountSession, AuthError, CartState, CartStore, Catalog, CatalogError, CheckoutError,
    OrderConfirmation, RegistrationForm,
};
use crate::storage::{FileStore, KeyValueStore};

/// One storefront session: the API client, the cart and the signed-in user.
///
/// This struct is cheaply cloneable via `Arc`; clones share the cart and
/// session.
pub struct Storefront<S> {
    inner: Arc<StorefrontInner<S>>,
}

struct StorefrontInner<S> {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartStore<S>,
    account: AccountSession<S>,
}

impl<S> Clone for Storefront<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Storefront<FileStore> {
    /// Start a session persisted under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client fails to build.
    pub fn open(config: StorefrontConfig) -> Result<Self, ApiError> {
        let storage = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_storage(config, storage)
    }
}

impl<S: KeyValueStore> Storefront<S> {
    /// Start a session over `storage`.
    ///
    /// Restores the signed-in user, then the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client fails to build.
    pub fn with_storage(config: StorefrontConfig, storage: Arc<S>) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let account = AccountSession::open(Arc::clone(&storage));
        let cart = CartStore::open(storage);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                cart,
                account,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the store API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore<S> {
        &self.inner.cart
    }

    /// Get a reference to the account session.
    #[must_use]
    pub fn account(&self) -> &AccountSession<S> {
        &self.inner.account
    }

    /// Load both catalog sections.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the product service is unreachable.
    pub async fn catalog(&self, filter: &GameFilter) -> Result<Catalog, CatalogError> {
        Catalog::load(&self.inner.api, filter).await
    }

    /// Look up a product and add one unit of it to the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Catalog` if the catalog cannot be loaded.
    /// Returns `AppError::NotFound` if no such product is listed.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, kind: ProductType, id: &ProductId) -> Result<CartState, AppError> {
        let catalog = self.catalog(&GameFilter::default()).await?;
        let product = catalog
            .find(kind, id)
            .ok_or_else(|| AppError::NotFound(format!("{kind} {id}")))?;
        Ok(self.inner.cart.add_item(product.to_line_item()))
    }

    /// Submit the cart as the signed-in user.
    ///
    /// # Errors
    ///
    /// See [`CartStore::checkout`].
    pub async fn checkout(&self) -> Result<OrderConfirmation, CheckoutError> {
        let identity = self.inner.account.current();
        self.inner
            .cart
            .checkout(identity.as_ref(), &self.inner.api)
            .await
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// See [`AccountSession::login`].
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<UserIdentity, AuthError> {
        self.inner.account.login(&self.inner.api, email, password).await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// See [`AccountSession::register`].
    pub async fn register(&self, form: &RegistrationForm) -> Result<UserIdentity, AuthError> {
        self.inner.account.register(&self.inner.api, form).await
    }

    /// Sign out. The cart is kept.
    pub fn logout(&self) {
        self.inner.account.logout();
    }
}
