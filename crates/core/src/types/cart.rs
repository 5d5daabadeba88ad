//! Cart and cart item types.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s, unique by product and with
//! every quantity at least 1. The invariants are enforced both by the mutation
//! methods and when a cart is deserialized, so a cart read back from storage
//! is either valid or rejected as a whole.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use super::{Price, Product, ProductId};

/// Violations of the cart invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartDataError {
    #[error("product {0} has a zero quantity")]
    ZeroQuantity(ProductId),
    #[error("product {0} appears more than once")]
    Duplicate(ProductId),
    #[error("product {0} is not in the cart")]
    NotFound(ProductId),
}

/// A product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    pub price: Price,
    pub image_url: String,
    pub quantity: u32,
}

impl CartItem {
    /// Build a cart line from catalog metadata.
    #[must_use]
    pub fn from_product(product: Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            title: product.title,
            price: product.price,
            image_url: product.image,
            quantity,
        }
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The shopper's current selection, in insertion order.
///
/// Serializes as a plain JSON array of [`CartItem`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities (the cart badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Append a new line.
    ///
    /// # Errors
    ///
    /// Returns an error if the item has a zero quantity or its product is
    /// already in the cart.
    pub fn push(&mut self, item: CartItem) -> Result<(), CartDataError> {
        if item.quantity == 0 {
            return Err(CartDataError::ZeroQuantity(item.product_id));
        }
        if self.contains(item.product_id) {
            return Err(CartDataError::Duplicate(item.product_id));
        }
        self.items.push(item);
        Ok(())
    }

    /// Change the quantity of an existing line in place.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is zero or the product is not in the cart.
    pub fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartDataError> {
        if quantity == 0 {
            return Err(CartDataError::ZeroQuantity(product_id));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
            .ok_or(CartDataError::NotFound(product_id))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove a line, keeping the order of the others.
    pub fn remove(&mut self, product_id: ProductId) -> Option<CartItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)?;
        Some(self.items.remove(index))
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartDataError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        let mut cart = Self::new();
        for item in items {
            cart.push(item)?;
        }
        Ok(cart)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
