//! Account session.
//!
//! Owns the optional signed-in [`UserIdentity`]. The identity is persisted
//! under [`keys::CURRENT_USER`] so it survives restarts, and mirrored into
//! the Sentry scope so errors are attributed to the user.

mod error;

pub use error::AuthError;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use gaming_store_core::{Email, UserIdentity};

use crate::api::{AccountResponse, ApiClient, ApiError, LoginRequest, RegisterRequest};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::storage::{KeyValueStore, keys};

/// Minimum password length accepted by the account service.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Message used when the account service declines without saying why.
const DEFAULT_REJECTION: &str = "The account service declined the request";

// =============================================================================
// Account Service
// =============================================================================

/// Backend that authenticates and creates accounts.
pub trait AccountService: Send + Sync {
    /// Check credentials.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AccountResponse, ApiError>> + Send;

    /// Create an account.
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<AccountResponse, ApiError>> + Send;
}

impl AccountService for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<AccountResponse, ApiError> {
        Self::login(self, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AccountResponse, ApiError> {
        Self::register(self, request).await
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Details collected by the registration form.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl RegistrationForm {
    /// Validate the form and build the request body.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if name or phone is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    pub fn validate(&self) -> Result<RegisterRequest, AuthError> {
        let name = required("name", &self.name)?;
        let email = Email::parse(&self.email)?;
        let phone = required("phone", &self.phone)?;
        validate_password(&self.password)?;

        Ok(RegisterRequest {
            name,
            email: email.into_inner(),
            password: self.password.expose_secret().to_owned(),
            phone,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Validate password meets requirements.
fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    let length = password.expose_secret().chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

// =============================================================================
// AccountSession
// =============================================================================

/// The signed-in user, if any.
pub struct AccountSession<S> {
    storage: Arc<S>,
    current: Mutex<Option<UserIdentity>>,
}

impl<S: KeyValueStore> AccountSession<S> {
    /// Create a logged-out session backed by `storage`.
    #[must_use]
    pub const fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            current: Mutex::new(None),
        }
    }

    /// Create a session and restore any persisted identity.
    #[must_use]
    pub fn open(storage: Arc<S>) -> Self {
        let session = Self::new(storage);
        session.restore();
        session
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<UserIdentity>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The signed-in user.
    #[must_use]
    pub fn current(&self) -> Option<UserIdentity> {
        self.lock_current().clone()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.lock_current().is_some()
    }

    /// Reload the identity persisted by a previous session.
    ///
    /// An unreadable or malformed snapshot is discarded and the session
    /// starts logged out.
    #[instrument(skip(self))]
    pub fn restore(&self) -> Option<UserIdentity> {
        let restored = match self.storage.get(keys::CURRENT_USER) {
            Ok(Some(raw)) => match serde_json::from_str::<UserIdentity>(&raw) {
                Ok(user) => Some(user),
                Err(error) => {
                    warn!(%error, "Discarding corrupt user snapshot");
                    self.forget_persisted();
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "Failed to read user snapshot");
                None
            }
        };

        if let Some(user) = &restored {
            debug!(user_id = %user.id, "Restored signed-in user");
            set_sentry_user(&user.id, Some(&user.email));
        }

        *self.lock_current() = restored.clone();
        restored
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::MissingField` if the password is blank.
    /// Returns `AuthError::Rejected` if the credentials are wrong.
    /// Returns `AuthError::Transport` if the account service is unreachable.
    #[instrument(skip(self, accounts, password))]
    pub async fn login<A: AccountService>(
        &self,
        accounts: &A,
        email: &str,
        password: &SecretString,
    ) -> Result<UserIdentity, AuthError> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let request = LoginRequest {
            email: email.into_inner(),
            password: password.expose_secret().to_owned(),
        };
        let response = accounts.login(&request).await?;
        self.accept(response)
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`RegistrationForm::validate`].
    /// Returns `AuthError::Rejected` if the account service declines (for
    /// example, the email is already registered).
    /// Returns `AuthError::Transport` if the account service is unreachable.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn register<A: AccountService>(
        &self,
        accounts: &A,
        form: &RegistrationForm,
    ) -> Result<UserIdentity, AuthError> {
        let request = form.validate()?;
        let response = accounts.register(&request).await?;
        self.accept(response)
    }

    /// Forget the signed-in user.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        let previous = self.lock_current().take();
        self.forget_persisted();
        clear_sentry_user();

        if let Some(user) = previous {
            info!(user_id = %user.id, "Signed out");
        }
    }

    fn accept(&self, response: AccountResponse) -> Result<UserIdentity, AuthError> {
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
            info!(%message, "Account request rejected");
            return Err(AuthError::Rejected(message));
        }

        let user = response.user.ok_or(AuthError::MissingUser)?;

        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(error) = self.storage.set(keys::CURRENT_USER, &json) {
                    warn!(%error, "Failed to persist signed-in user");
                }
            }
            Err(error) => warn!(%error, "Failed to serialize signed-in user"),
        }

        set_sentry_user(&user.id, Some(&user.email));
        *self.lock_current() = Some(user.clone());

        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    fn forget_persisted(&self) {
        if let Err(error) = self.storage.remove(keys::CURRENT_USER) {
            warn!(%error, "Failed to remove user snapshot");
        }
    }
}
