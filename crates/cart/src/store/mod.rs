//! Persistent key-value stores for the cart mirror.
//!
//! A [`CartStore`] is a synchronous string store, the same shape as a
//! browser's local storage. The cart is kept under a single key as a JSON
//! array of cart items (see [`Cart`]).

mod file;
mod memory;

use storefront_cart_core::Cart;
use thiserror::Error;
use tracing::warn;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur when reading or writing a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key cannot be mapped onto the store.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Store refuses writes (quota exceeded, read-only, ...).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous string key-value store.
pub trait CartStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the backing storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the backing storage cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Load the cart mirrored under `key`.
///
/// A missing, unreadable or malformed value yields an empty cart; the latter
/// two are logged.
pub fn load_cart<S: CartStore + ?Sized>(store: &S, key: &str) -> Cart {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(key, error = %e, "Stored cart is malformed, starting empty");
        Cart::new()
    })
}

/// Mirror `cart` under `key`.
///
/// # Errors
///
/// Returns error if the cart cannot be serialized or the store write fails.
pub fn save_cart<S: CartStore + ?Sized>(store: &S, key: &str, cart: &Cart) -> Result<(), StoreError> {
    let json = serde_json::to_string(cart)?;
    store.write(key, &json)
}
