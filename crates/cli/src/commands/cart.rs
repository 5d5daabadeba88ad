//! Cart commands.
//!
//! Each command runs one manager operation and logs the resulting cart.

use tracing::{info, warn};

use storefront_cart::{CartChange, CartError, CartManager, CartStore, CatalogService, Notifier};
use storefront_cart_core::{Cart, ProductId};

/// Log the current cart.
pub fn show<C, S, N>(manager: &CartManager<C, S, N>)
where
    C: CatalogService,
    S: CartStore,
    N: Notifier,
{
    log_cart(&manager.cart());
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns the manager's rejection reason.
pub async fn add<C, S, N>(
    manager: &CartManager<C, S, N>,
    product_id: ProductId,
) -> Result<(), CartError>
where
    C: CatalogService,
    S: CartStore,
    N: Notifier,
{
    let change = manager.add_product(product_id).await?;
    log_change(&change);
    Ok(())
}

/// Remove a product.
///
/// # Errors
///
/// Returns the manager's rejection reason.
pub async fn remove<C, S, N>(
    manager: &CartManager<C, S, N>,
    product_id: ProductId,
) -> Result<(), CartError>
where
    C: CatalogService,
    S: CartStore,
    N: Notifier,
{
    let change = manager.remove_product(product_id).await?;
    log_change(&change);
    Ok(())
}

/// Set the quantity of a product.
///
/// # Errors
///
/// Returns the manager's rejection reason.
pub async fn set<C, S, N>(
    manager: &CartManager<C, S, N>,
    product_id: ProductId,
    amount: i64,
) -> Result<(), CartError>
where
    C: CatalogService,
    S: CartStore,
    N: Notifier,
{
    let change = manager.update_product_amount(product_id, amount).await?;
    log_change(&change);
    Ok(())
}

fn log_change(change: &CartChange) {
    if !change.persisted {
        warn!("Cart change was not saved and will be lost on exit");
    }
    log_cart(&change.cart);
}

fn log_cart(cart: &Cart) {
    if cart.is_empty() {
        info!("Cart is empty");
        return;
    }

    for item in cart {
        info!(
            "  [{}] {} x {} @ {} = {}",
            item.product_id,
            item.quantity,
            item.title,
            item.price,
            item.line_total()
        );
    }
    info!(
        "Items: {}  Subtotal: {}",
        cart.total_quantity(),
        cart.subtotal()
    );
}
