//! Cart operation errors.

use storefront_cart_core::{CartDataError, ProductId};
use thiserror::Error;

use crate::catalog::LookupError;

/// Why a cart operation was rejected.
///
/// A rejected operation leaves the cart, the store and every subscriber
/// exactly as they were.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds the available stock.
    #[error("Out of stock: requested {requested} of product {product_id}, {available} available")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Product is not in the cart.
    #[error("Product not in cart: {0}")]
    ProductNotFound(ProductId),

    /// Requested quantity is below 1.
    #[error("Invalid amount {amount} for product {product_id}")]
    InvalidAmount { product_id: ProductId, amount: i64 },

    /// Stock or product lookup failed.
    #[error("Lookup failed for product {product_id}: {source}")]
    LookupFailed {
        product_id: ProductId,
        #[source]
        source: LookupError,
    },

    /// Cart invariant violated while applying the change.
    #[error(transparent)]
    Cart(#[from] CartDataError),
}

impl CartError {
    /// Product the failed operation referred to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::OutOfStock { product_id, .. }
            | Self::InvalidAmount { product_id, .. }
            | Self::LookupFailed { product_id, .. }
            | Self::ProductNotFound(product_id)
            | Self::Cart(
                CartDataError::ZeroQuantity(product_id)
                | CartDataError::Duplicate(product_id)
                | CartDataError::NotFound(product_id),
            ) => *product_id,
        }
    }

    pub(crate) const fn lookup(product_id: ProductId, source: LookupError) -> Self {
        Self::LookupFailed { product_id, source }
    }
}
