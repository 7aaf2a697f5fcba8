//! Durable client-side storage.
//!
//! The storefront keeps its cart and signed-in user in a small key/value
//! store that survives restarts, the same role browser local storage plays
//! for the web page. Values are opaque strings (JSON snapshots); a write
//! always overwrites the previous value for the key.
//!
//! # Backends
//!
//! - [`FileStore`] - one file per key under the configured data directory
//! - [`MemoryStore`] - process-local map, for tests and throwaway sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage keys shared by the cart store and account session.
pub mod keys {
    /// Serialized cart line items.
    pub const CART_ITEMS: &str = "gamingStoreCart";

    /// Serialized cart total. Advisory only; the total is recomputed on load.
    pub const CART_TOTAL: &str = "gamingStoreCartTotal";

    /// Serialized signed-in user. Absent when logged out.
    pub const CURRENT_USER: &str = "gamingStoreUser";
}

/// Errors that can occur when reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The key contains characters that cannot be stored.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Opaque string key/value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
