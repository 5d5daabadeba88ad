//! Cart client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CART_API_URL` - Base URL of the stock/product lookup service
//!
//! ## Optional
//! - `CART_API_TOKEN` - Bearer token sent to the lookup service
//! - `CART_REQUEST_TIMEOUT_SECS` - Lookup request timeout (default: 10)
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart (default: .cart)
//! - `CART_STORAGE_KEY` - Key the cart is stored under (default: @RocketShoes:cart)
//! - `CART_NOTIFY_SUCCESS` - Emit confirmation notifications (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::manager::{CartSettings, DEFAULT_STORAGE_KEY};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORAGE_DIR: &str = ".cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart client configuration.
#[derive(Debug, Clone)]
pub struct CartClientConfig {
    /// Lookup service configuration
    pub catalog: CatalogConfig,
    /// Cart persistence configuration
    pub storage: StorageConfig,
    /// Emit a confirmation notification after successful operations
    pub notify_success: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Stock/product lookup service configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL; endpoints are resolved relative to it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl CatalogConfig {
    /// Configuration with default timeout and no token.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Cart persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory for the file store
    pub dir: PathBuf,
    /// Key the cart is stored under
    pub key: String,
}

impl CartClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_source<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = Source(get);

        let base_url = source.required("CART_API_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CART_API_URL".to_string(), e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_API_URL".to_string(),
                "URL cannot be used as a base".to_string(),
            ));
        }

        let timeout_secs = source
            .or_default(
                "CART_REQUEST_TIMEOUT_SECS",
                &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            )
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CART_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let catalog = CatalogConfig {
            base_url: with_trailing_slash(base_url),
            api_token: source.optional("CART_API_TOKEN").map(SecretString::from),
            request_timeout: Duration::from_secs(timeout_secs),
        };

        let key = source.or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if key.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let storage = StorageConfig {
            dir: PathBuf::from(source.or_default("CART_STORAGE_DIR", DEFAULT_STORAGE_DIR)),
            key,
        };

        let notify_success = parse_bool(
            "CART_NOTIFY_SUCCESS",
            &source.or_default("CART_NOTIFY_SUCCESS", "true"),
        )?;

        Ok(Self {
            catalog,
            storage,
            notify_success,
            sentry_dsn: source.optional("SENTRY_DSN"),
        })
    }

    /// Manager settings derived from this configuration.
    #[must_use]
    pub fn settings(&self) -> CartSettings {
        CartSettings {
            storage_key: self.storage.key.clone(),
            notify_success: self.notify_success,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Source<F>(F);

impl<F: Fn(&str) -> Option<String>> Source<F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}

/// Make `url` usable as a base for relative joins (`/api` → `/api/`).
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartClientConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("CART_API_URL", "http://localhost:3333")]).expect("config");

        assert_eq!(config.catalog.base_url.as_str(), "http://localhost:3333/");
        assert!(config.catalog.api_token.is_none());
        assert_eq!(config.catalog.request_timeout, Duration::from_secs(10));
        assert_eq!(config.storage.dir, PathBuf::from(".cart"));
        assert_eq!(config.storage.key, "@RocketShoes:cart");
        assert!(config.notify_success);
        assert!(config.sentry_dsn.is_none());
        assert_eq!(config.settings(), CartSettings::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CART_API_URL", "https://shop.example.com/api"),
            ("CART_API_TOKEN", "t0k3n"),
            ("CART_REQUEST_TIMEOUT_SECS", "3"),
            ("CART_STORAGE_DIR", "/var/lib/cart"),
            ("CART_STORAGE_KEY", "shop:cart"),
            ("CART_NOTIFY_SUCCESS", "off"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .expect("config");

        assert_eq!(config.catalog.base_url.as_str(), "https://shop.example.com/api/");
        assert_eq!(
            config.catalog.api_token.as_ref().map(ExposeSecret::expose_secret),
            Some("t0k3n")
        );
        assert_eq!(config.catalog.request_timeout, Duration::from_secs(3));
        assert_eq!(config.storage.dir, PathBuf::from("/var/lib/cart"));
        assert_eq!(config.settings().storage_key, "shop:cart");
        assert!(!config.settings().notify_success);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).expect_err("missing url");
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "CART_API_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("CART_API_URL", "not a url")]).expect_err("bad url");
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "CART_API_URL"));

        let err = load(&[("CART_API_URL", "mailto:shop@example.com")]).expect_err("no base");
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "CART_API_URL"));

        let err = load(&[
            ("CART_API_URL", "http://localhost"),
            ("CART_NOTIFY_SUCCESS", "maybe"),
        ])
        .expect_err("bad bool");
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "CART_NOTIFY_SUCCESS"));

        let err = load(&[
            ("CART_API_URL", "http://localhost"),
            ("CART_REQUEST_TIMEOUT_SECS", "-1"),
        ])
        .expect_err("bad timeout");
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(key, _) if key == "CART_REQUEST_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[
            ("CART_API_URL", "http://localhost"),
            ("CART_API_TOKEN", "super-private"),
        ])
        .expect("config");

        let debug = format!("{:?}", config.catalog);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-private"));
    }
}
