//! Records served by the remote catalog API.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A catalog product as returned by `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Absolute image URL.
    pub image: String,
}

/// Units available for a product, as returned by `GET /stock/{id}`.
///
/// Always fetched fresh; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: ProductId,
    pub amount: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_catalog_json() {
        let json = r#"{
            "id": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://example.com/shoe-1.jpg"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(17990));
    }

    #[test]
    fn test_negative_stock_is_rejected() {
        let result = serde_json::from_str::<StockRecord>(r#"{"id": 1, "amount": -2}"#);
        assert!(result.is_err());
    }
}
