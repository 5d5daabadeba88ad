//! The cart manager.
//!
//! [`CartManager`] owns the shopper's cart. Each mutating operation runs the
//! same sequence under a single writer lock:
//!
//! 1. validate the request (amount, presence, live stock count)
//! 2. compute the new cart on a private copy
//! 3. mirror it to the [`CartStore`]
//! 4. publish it to subscribers with one `send_replace`
//! 5. emit a [`Notification`]
//!
//! A rejected operation stops before step 3, so nothing is observed. A failed
//! store write does not reject the operation: the in-memory cart is still
//! updated and [`CartChange::persisted`] reports the miss.
//!
//! The writer lock serializes mutations, so two racing `add_product` calls
//! for the same product both count. Reads ([`CartManager::cart`] and
//! subscribers) never wait on it.

use std::fmt;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use storefront_cart_core::{Cart, CartItem, ProductId, StockInfo};

use crate::catalog::CatalogService;
use crate::error::CartError;
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::store::{CartStore, load_cart, save_cart};

/// Storage key the cart is mirrored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// The three mutating cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::UpdateAmount => "update_amount",
        })
    }
}

/// Behaviour knobs for a [`CartManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSettings {
    /// Key the cart is mirrored under in the store.
    pub storage_key: String,
    /// Emit a confirmation notification for successful operations.
    pub notify_success: bool,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            notify_success: true,
        }
    }
}

/// Result of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartChange {
    /// Snapshot published by the operation.
    pub cart: Cart,
    /// Whether the snapshot reached the store.
    pub persisted: bool,
}

/// Shopping cart state manager.
///
/// Construct one with [`CartManager::initialize`] at start-up and share it
/// (usually behind an `Arc`) with everything that reads or changes the cart.
pub struct CartManager<C, S, N = TracingNotifier> {
    catalog: C,
    store: S,
    notifier: N,
    settings: CartSettings,
    state: watch::Sender<Cart>,
    writer: Mutex<()>,
}

impl<C, S, N> fmt::Debug for CartManager<C, S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartManager")
            .field("settings", &self.settings)
            .field("cart", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<C, S, N> CartManager<C, S, N>
where
    C: CatalogService,
    S: CartStore,
    N: Notifier,
{
    /// Create a manager holding the cart mirrored in `store`.
    ///
    /// A missing or malformed stored cart starts the manager empty. Stored
    /// quantities are not revalidated against stock here.
    pub fn initialize(catalog: C, store: S, notifier: N, settings: CartSettings) -> Self {
        let cart = load_cart(&store, &settings.storage_key);
        info!(
            key = %settings.storage_key,
            items = cart.len(),
            "Cart initialized"
        );

        Self {
            catalog,
            store,
            notifier,
            settings,
            state: watch::Sender::new(cart),
            writer: Mutex::new(()),
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    ///
    /// The receiver starts with the current cart marked as seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    #[must_use]
    pub const fn settings(&self) -> &CartSettings {
        &self.settings
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart has its quantity raised by one; a new
    /// product is appended with quantity 1 after fetching its catalog entry.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`] if the new quantity exceeds stock
    /// - [`CartError::LookupFailed`] if the stock or product lookup fails
    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<CartChange, CartError> {
        let result = self.try_add_product(product_id).await;
        self.report(CartOperation::Add, &result);
        result
    }

    /// Remove a product line entirely.
    ///
    /// # Errors
    ///
    /// - [`CartError::ProductNotFound`] if the product is not in the cart
    #[instrument(skip(self))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<CartChange, CartError> {
        let result = self.try_remove_product(product_id).await;
        self.report(CartOperation::Remove, &result);
        result
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidAmount`] if `amount` is below 1
    /// - [`CartError::ProductNotFound`] if the product is not in the cart
    /// - [`CartError::OutOfStock`] if `amount` exceeds stock
    /// - [`CartError::LookupFailed`] if the stock lookup fails
    #[instrument(skip(self))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<CartChange, CartError> {
        let result = self.try_update_product_amount(product_id, amount).await;
        self.report(CartOperation::UpdateAmount, &result);
        result
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<CartChange, CartError> {
        let _writer = self.writer.lock().await;
        let stock = self.stock(product_id).await?;
        let mut cart = self.cart();

        let current = cart.get(product_id).map(|item| item.quantity);
        if let Some(current) = current {
            let requested = current.saturating_add(1);
            ensure_in_stock(&stock, requested)?;
            cart.set_quantity(product_id, requested)?;
        } else {
            ensure_in_stock(&stock, 1)?;
            let mut product = self
                .catalog
                .product(product_id)
                .await
                .map_err(|e| CartError::lookup(product_id, e))?;
            product.id = product_id;
            cart.push(CartItem::from_product(product, 1))?;
        }

        Ok(self.commit(cart))
    }

    async fn try_remove_product(&self, product_id: ProductId) -> Result<CartChange, CartError> {
        let _writer = self.writer.lock().await;
        let mut cart = self.cart();

        cart.remove(product_id)
            .ok_or(CartError::ProductNotFound(product_id))?;

        Ok(self.commit(cart))
    }

    async fn try_update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<CartChange, CartError> {
        if amount < 1 {
            return Err(CartError::InvalidAmount { product_id, amount });
        }

        let _writer = self.writer.lock().await;
        if !self.state.borrow().contains(product_id) {
            return Err(CartError::ProductNotFound(product_id));
        }

        let stock = self.stock(product_id).await?;
        // Anything past u32::MAX is out of stock by definition.
        let requested = u32::try_from(amount).unwrap_or(u32::MAX);
        ensure_in_stock(&stock, requested)?;

        let mut cart = self.cart();
        cart.set_quantity(product_id, requested)?;

        Ok(self.commit(cart))
    }

    async fn stock(&self, product_id: ProductId) -> Result<StockInfo, CartError> {
        let stock = self
            .catalog
            .stock(product_id)
            .await
            .map_err(|e| CartError::lookup(product_id, e))?;
        debug!(%product_id, available = stock.available, "Stock checked");
        Ok(stock)
    }

    /// Persist and publish a validated cart. Must be called with the writer
    /// lock held.
    fn commit(&self, cart: Cart) -> CartChange {
        let persisted = match save_cart(&self.store, &self.settings.storage_key, &cart) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    key = %self.settings.storage_key,
                    error = %e,
                    "Failed to persist cart, keeping in-memory update"
                );
                false
            }
        };

        self.state.send_replace(cart.clone());
        CartChange { cart, persisted }
    }

    fn report(&self, operation: CartOperation, result: &Result<CartChange, CartError>) {
        match result {
            Ok(change) => {
                info!(
                    %operation,
                    items = change.cart.len(),
                    persisted = change.persisted,
                    "Cart updated"
                );
                if self.settings.notify_success {
                    self.notifier.notify(&Notification::for_success(operation));
                }
            }
            Err(e) => {
                warn!(%operation, error = %e, "Cart operation rejected");
                self.notifier
                    .notify(&Notification::for_failure(operation, e));
            }
        }
    }
}

fn ensure_in_stock(stock: &StockInfo, requested: u32) -> Result<(), CartError> {
    if stock.covers(requested) {
        Ok(())
    } else {
        Err(CartError::OutOfStock {
            product_id: stock.product_id,
            requested,
            available: stock.available,
        })
    }
}
