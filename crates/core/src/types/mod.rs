//! Core types for the storefront cart.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartDataError, CartItem};
pub use id::*;
pub use price::Price;
pub use product::{Product, StockInfo};
