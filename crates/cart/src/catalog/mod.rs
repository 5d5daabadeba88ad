//! Stock and product lookups.
//!
//! The cart manager never trusts its own copy of stock levels: every quantity
//! change asks a [`CatalogService`] for the current count first. Two
//! implementations ship with the crate:
//!
//! - [`HttpCatalog`] - talks to the storefront's REST lookup service
//! - [`InMemoryCatalog`] - process-local catalog for demos and tests

mod http;
mod memory;

use std::future::Future;

use storefront_cart_core::{Product, ProductId, StockInfo};
use thiserror::Error;

pub use http::HttpCatalog;
pub use memory::InMemoryCatalog;

/// Errors that can occur when looking up stock or product metadata.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Service is unreachable for a reason other than HTTP.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Source of truth for stock levels and product metadata.
pub trait CatalogService: Send + Sync {
    /// Current stock count for a product.
    fn stock(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<StockInfo, LookupError>> + Send;

    /// Catalog metadata (title, price, image) for a product.
    fn product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Product, LookupError>> + Send;
}
