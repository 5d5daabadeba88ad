//! Storefront Cart - shopping cart state manager.
//!
//! The [`CartManager`] owns the shopper's cart and exposes three mutating
//! operations (add, remove, set amount). Every quantity change is validated
//! against a live stock lookup, mirrored to a [`CartStore`], published to
//! subscribers and reported to a [`Notifier`].
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_cart::{CartClientConfig, CartManager, FileStore, HttpCatalog, TracingNotifier};
//! use storefront_cart_core::ProductId;
//!
//! let config = CartClientConfig::from_env()?;
//! let manager = CartManager::initialize(
//!     HttpCatalog::new(&config.catalog)?,
//!     FileStore::new(&config.storage.dir),
//!     TracingNotifier,
//!     config.settings(),
//! );
//!
//! let change = manager.add_product(ProductId::new(42)).await?;
//! assert!(change.cart.contains(ProductId::new(42)));
//! ```
//!
//! # Modules
//!
//! - [`catalog`] - Stock and product lookups (HTTP and in-memory)
//! - [`store`] - Persistent key-value stores for the cart mirror
//! - [`notify`] - User-facing notifications
//! - [`manager`] - The cart manager itself
//! - [`config`] - Environment-based configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod manager;
pub mod notify;
pub mod store;

pub use catalog::{CatalogService, HttpCatalog, InMemoryCatalog, LookupError};
pub use config::{CartClientConfig, CatalogConfig, ConfigError, StorageConfig};
pub use error::CartError;
pub use manager::{CartChange, CartManager, CartOperation, CartSettings, DEFAULT_STORAGE_KEY};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use store::{CartStore, FileStore, MemoryStore, StoreError};
