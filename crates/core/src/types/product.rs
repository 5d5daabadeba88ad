//! Catalog types served by the stock/product lookup service.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Catalog metadata for a single product.
///
/// Field names follow the lookup service's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Absolute URL of the product image.
    pub image: String,
}

/// Point-in-time stock count for a product.
///
/// Fetched on demand before every quantity change and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockInfo {
    pub product_id: ProductId,
    /// Units that can still be purchased.
    pub available: u32,
}

impl StockInfo {
    /// Create a stock snapshot.
    #[must_use]
    pub const fn new(product_id: ProductId, available: u32) -> Self {
        Self {
            product_id,
            available,
        }
    }

    /// Whether `quantity` units can be held in a cart.
    #[must_use]
    pub const fn covers(&self, quantity: u32) -> bool {
        quantity <= self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_info_covers() {
        let stock = StockInfo::new(ProductId::new(42), 5);
        assert!(stock.covers(1));
        assert!(stock.covers(5));
        assert!(!stock.covers(6));
        assert!(!StockInfo::new(ProductId::new(42), 0).covers(1));
    }

    #[test]
    fn test_product_wire_format() {
        let json = r#"{
            "id": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://example.com/shoe.jpg"
        }"#;
        let product: Product = serde_json::from_str(json).expect("deserialize product");
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(17990));
    }
}
