//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for UI-facing code. Service errors
//! convert into it with `?`; [`AppError::user_message`] is what gets shown,
//! and [`AppError::report`] captures infrastructure failures to Sentry.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::{AuthError, CatalogError, CheckoutError};
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API call failed outside any service.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Durable storage could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Login or registration failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Requested product does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error points at infrastructure rather than user input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Api(_)
                | Self::Storage(_)
                | Self::Catalog(_)
                | Self::Auth(AuthError::Transport(_) | AuthError::MissingUser)
                | Self::Checkout(CheckoutError::Transport(_))
        )
    }

    /// Message safe to show to the user.
    ///
    /// Transport and internal details are replaced by a generic message;
    /// they are still available through `Display` for logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => format!("Configuration problem: {err}"),
            Self::Api(_) | Self::Catalog(_) => {
                "The store is unavailable right now. Please try again later.".to_string()
            }
            Self::Storage(_) => "Could not access local storage".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::MissingField(field) => format!("Please enter your {field}"),
                AuthError::WeakPassword(msg) | AuthError::Rejected(msg) => msg.clone(),
                AuthError::MissingUser | AuthError::Transport(_) => {
                    "Could not reach the account service. Please try again later.".to_string()
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::NotAuthenticated => {
                    "Please sign in to complete your purchase".to_string()
                }
                CheckoutError::InProgress => "Your order is already being submitted".to_string(),
                CheckoutError::OrderRejected(msg) => msg.clone(),
                CheckoutError::Transport(_) => {
                    "Could not place the order. Please try again later.".to_string()
                }
            },
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Log the error, capturing internal ones to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command failed"
            );
        } else {
            tracing::info!(error = %self, "Command refused");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item to cart", Some(&[("name", "Elden Ring")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
