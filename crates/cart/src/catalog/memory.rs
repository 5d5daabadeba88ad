//! Process-local catalog.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use storefront_cart_core::{Product, ProductId, StockInfo};

use super::{CatalogService, LookupError};

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<ProductId, Product>,
    stock: HashMap<ProductId, u32>,
    offline: bool,
}

/// In-memory catalog.
///
/// Cloning is cheap and every clone shares the same products and stock, so a
/// test can keep a handle and change stock levels after handing a clone to a
/// [`CartManager`](crate::CartManager).
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a product together with its stock count.
    #[must_use]
    pub fn with_product(self, product: Product, available: u32) -> Self {
        self.insert(product, available);
        self
    }

    /// Add (or replace) a product together with its stock count.
    pub fn insert(&self, product: Product, available: u32) {
        let mut inner = self.lock();
        inner.stock.insert(product.id, available);
        inner.products.insert(product.id, product);
    }

    /// Change the stock count of a product.
    pub fn set_stock(&self, product_id: ProductId, available: u32) {
        self.lock().stock.insert(product_id, available);
    }

    /// Simulate a network outage: every lookup fails while offline.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_online(inner: &Inner) -> Result<(), LookupError> {
        if inner.offline {
            return Err(LookupError::Unavailable("catalog is offline".to_string()));
        }
        Ok(())
    }
}

impl CatalogService for InMemoryCatalog {
    async fn stock(&self, product_id: ProductId) -> Result<StockInfo, LookupError> {
        let inner = self.lock();
        Self::check_online(&inner)?;
        inner
            .stock
            .get(&product_id)
            .map(|available| StockInfo::new(product_id, *available))
            .ok_or_else(|| LookupError::NotFound(format!("stock {product_id}")))
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, LookupError> {
        let inner = self.lock();
        Self::check_online(&inner)?;
        inner
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(format!("products {product_id}")))
    }
}

#[cfg(test)]
mod tests {
    use storefront_cart_core::Price;

    use super::*;

    fn sneaker() -> Product {
        Product {
            id: ProductId::new(1),
            title: "Sneaker".to_string(),
            price: Price::from_cents(17990),
            image: "https://example.com/sneaker.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_lookups() {
        let catalog = InMemoryCatalog::new().with_product(sneaker(), 3);

        let stock = catalog.stock(ProductId::new(1)).await.expect("stock");
        assert_eq!(stock.available, 3);

        let product = catalog.product(ProductId::new(1)).await.expect("product");
        assert_eq!(product.title, "Sneaker");

        assert!(matches!(
            catalog.stock(ProductId::new(2)).await,
            Err(LookupError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let catalog = InMemoryCatalog::new().with_product(sneaker(), 3);
        let handle = catalog.clone();

        handle.set_stock(ProductId::new(1), 0);
        let stock = catalog.stock(ProductId::new(1)).await.expect("stock");
        assert_eq!(stock.available, 0);

        handle.set_offline(true);
        assert!(matches!(
            catalog.product(ProductId::new(1)).await,
            Err(LookupError::Unavailable(_))
        ));
    }
}
