//! Account error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during login and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] gaming_store_core::EmailError),

    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The account service declined the request (wrong password, email
    /// already registered, ...).
    #[error("{0}")]
    Rejected(String),

    /// The account service reported success without returning the user.
    #[error("account service returned no user")]
    MissingUser,

    /// The account service could not be reached or answered garbage.
    #[error("account service unavailable: {0}")]
    Transport(#[from] ApiError),
}
