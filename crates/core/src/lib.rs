//! Storefront Cart Core - Shared types library.
//!
//! This crate provides the types shared by every storefront cart component:
//! - `storefront-cart` - Cart manager, catalog lookups and cart persistence
//! - `storefront-cart-cli` - Command-line driver for the cart manager
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, cart items and stock snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
