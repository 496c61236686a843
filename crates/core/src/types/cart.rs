//! The shopping cart and its entries.
//!
//! A [`Cart`] holds at most one [`CartEntry`] per product and every entry has
//! an amount of at least one. All mutations are read-modify-write on the full
//! list: each helper returns a new `Cart` and leaves `self` untouched, so a
//! caller can validate and persist the candidate before committing it.
//!
//! # Stored format
//!
//! ```json
//! [{"productId": 1, "amount": 2, "name": "...", "price": 179.90, "image": "..."}]
//! ```
//!
//! Carts written by the earlier browser client used `id` and `title` instead
//! of `productId` and `name`; both spellings are accepted on decode.

use std::collections::HashSet;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Price, Product, ProductId};

/// Errors that can occur when decoding a persisted [`Cart`].
#[derive(Debug, Error)]
pub enum CartDecodeError {
    /// The payload is not a JSON array of cart entries.
    #[error("malformed cart payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entries share a product id.
    #[error("duplicate cart entry for product {0}")]
    DuplicateProduct(ProductId),

    /// An entry has an amount of zero.
    #[error("cart entry for product {0} has zero amount")]
    ZeroAmount(ProductId),
}

/// One product line in the cart.
///
/// Product attributes are a snapshot taken when the product was first added;
/// later catalog changes do not alter an existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    pub amount: u32,
    #[serde(alias = "title")]
    pub name: String,
    pub price: Price,
    pub image: String,
}

impl CartEntry {
    /// Create a single-unit entry from a catalog product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            amount: 1,
            name: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }

    /// Price of this line (unit price times amount).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// The user's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartEntry>", into = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a cart from entries, enforcing the cart invariants.
    ///
    /// # Errors
    ///
    /// Returns `CartDecodeError::DuplicateProduct` if two entries share a
    /// product id, or `CartDecodeError::ZeroAmount` if an entry has amount 0.
    pub fn from_entries(entries: Vec<CartEntry>) -> Result<Self, CartDecodeError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.amount == 0 {
                return Err(CartDecodeError::ZeroAmount(entry.product_id));
            }
            if !seen.insert(entry.product_id) {
                return Err(CartDecodeError::DuplicateProduct(entry.product_id));
            }
        }
        Ok(Self { entries })
    }

    /// Decode a cart from its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns `CartDecodeError` if the payload is malformed or violates the
    /// cart invariants.
    pub fn decode(payload: &str) -> Result<Self, CartDecodeError> {
        let entries: Vec<CartEntry> = serde_json::from_str(payload)?;
        Self::from_entries(entries)
    }

    /// Encode the cart to its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// All entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn find(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.product_id == product_id)
    }

    /// Whether the cart has an entry for a product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.find(product_id).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products (the header badge count).
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.len()
    }

    /// Sum of amounts across all entries.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// A copy of the cart with one more unit of `product_id`.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn with_incremented(&self, product_id: ProductId) -> Option<Self> {
        let current = self.find(product_id)?.amount;
        let amount = NonZeroU32::new(current.saturating_add(1))?;
        self.with_amount(product_id, amount)
    }

    /// A copy of the cart containing `product`.
    ///
    /// A product new to the cart is appended with amount 1; a product already
    /// present is incremented instead, so the one-entry-per-product invariant
    /// holds whatever the caller does.
    #[must_use]
    pub fn with_product(&self, product: &Product) -> Self {
        if let Some(next) = self.with_incremented(product.id) {
            return next;
        }
        let mut entries = self.entries.clone();
        entries.push(CartEntry::from_product(product));
        Self { entries }
    }

    /// A copy of the cart with the amount of `product_id` set to `amount`.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn with_amount(&self, product_id: ProductId, amount: NonZeroU32) -> Option<Self> {
        let position = self
            .entries
            .iter()
            .position(|e| e.product_id == product_id)?;
        let mut entries = self.entries.clone();
        if let Some(entry) = entries.get_mut(position) {
            entry.amount = amount.get();
        }
        Some(Self { entries })
    }

    /// A copy of the cart without `product_id`.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn without(&self, product_id: ProductId) -> Option<Self> {
        if !self.contains(product_id) {
            return None;
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| e.product_id != product_id)
            .cloned()
            .collect();
        Some(Self { entries })
    }
}

impl TryFrom<Vec<CartEntry>> for Cart {
    type Error = CartDecodeError;

    fn try_from(entries: Vec<CartEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<Cart> for Vec<CartEntry> {
    fn from(cart: Cart) -> Self {
        cart.entries
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Shoe {id}"),
            price: Price::from_cents(cents),
            image: format!("https://example.com/{id}.jpg"),
        }
    }

    fn amount(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_with_product_appends_single_unit() {
        let cart = Cart::new().with_product(&product(5, 1000));
        assert_eq!(cart.len(), 1);
        let entry = cart.find(ProductId::new(5)).unwrap();
        assert_eq!(entry.amount, 1);
        assert_eq!(entry.name, "Shoe 5");
    }

    #[test]
    fn test_with_product_twice_keeps_one_entry() {
        let p = product(5, 1000);
        let cart = Cart::new().with_product(&p).with_product(&p);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.find(p.id).unwrap().amount, 2);
    }

    #[test]
    fn test_with_amount_is_absolute_and_leaves_original() {
        let cart = Cart::new().with_product(&product(2, 500));
        let updated = cart.with_amount(ProductId::new(2), amount(4)).unwrap();
        assert_eq!(updated.find(ProductId::new(2)).unwrap().amount, 4);
        assert_eq!(cart.find(ProductId::new(2)).unwrap().amount, 1);
        assert!(cart.with_amount(ProductId::new(9), amount(1)).is_none());
    }

    #[test]
    fn test_without_keeps_other_entries() {
        let cart = Cart::new()
            .with_product(&product(1, 100))
            .with_product(&product(2, 200))
            .with_product(&product(3, 300));
        let reduced = cart.without(ProductId::new(2)).unwrap();
        assert_eq!(reduced.len(), 2);
        assert!(!reduced.contains(ProductId::new(2)));
        assert_eq!(reduced.find(ProductId::new(1)), cart.find(ProductId::new(1)));
        assert_eq!(reduced.find(ProductId::new(3)), cart.find(ProductId::new(3)));
        assert!(cart.without(ProductId::new(9)).is_none());
    }

    #[test]
    fn test_totals() {
        let cart = Cart::new()
            .with_product(&product(1, 1000))
            .with_amount(ProductId::new(1), amount(3))
            .unwrap()
            .with_product(&product(2, 250));
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total_units(), 4);
        assert_eq!(cart.subtotal(), Price::from_cents(3250));
    }

    #[test]
    fn test_encode_decode_preserves_cart() {
        let cart = Cart::new()
            .with_product(&product(1, 17990))
            .with_product(&product(2, 13990))
            .with_incremented(ProductId::new(2))
            .unwrap();
        let decoded = Cart::decode(&cart.encode().unwrap()).unwrap();
        assert_eq!(decoded, cart);

        let empty = Cart::decode(&Cart::new().encode().unwrap()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_encode_decode_keeps_exact_price() {
        let mut shoe = product(1, 0);
        shoe.price = Price::new(Decimal::from_str_exact("12345678901234567.89").unwrap());
        let cart = Cart::new().with_product(&shoe);

        let decoded = Cart::decode(&cart.encode().unwrap()).unwrap();

        assert_eq!(decoded, cart);
        assert_eq!(decoded.entries().first().unwrap().price.amount(), shoe.price.amount());
    }

    #[test]
    fn test_encoded_field_names() {
        let cart = Cart::new().with_product(&product(1, 17990));
        let value: serde_json::Value = serde_json::from_str(&cart.encode().unwrap()).unwrap();
        let entry = &value[0];
        assert_eq!(entry["productId"], 1);
        assert_eq!(entry["amount"], 1);
        assert_eq!(entry["name"], "Shoe 1");
        assert!(entry["price"].is_number());
        assert_eq!(entry["price"].to_string(), "179.90");
        assert_eq!(entry["image"], "https://example.com/1.jpg");
    }

    #[test]
    fn test_decode_accepts_legacy_field_names() {
        let payload = r#"[{"id": 3, "title": "Old", "price": 99.9, "image": "x", "amount": 2}]"#;
        let cart = Cart::decode(payload).unwrap();
        let entry = cart.find(ProductId::new(3)).unwrap();
        assert_eq!(entry.name, "Old");
        assert_eq!(entry.amount, 2);
    }

    #[test]
    fn test_decode_rejects_invalid_payloads() {
        assert!(matches!(
            Cart::decode("{not json"),
            Err(CartDecodeError::Json(_))
        ));

        let zero = r#"[{"productId": 1, "amount": 0, "name": "a", "price": 1, "image": ""}]"#;
        assert!(matches!(
            Cart::decode(zero),
            Err(CartDecodeError::ZeroAmount(id)) if id == ProductId::new(1)
        ));

        let dup = r#"[
            {"productId": 1, "amount": 1, "name": "a", "price": 1, "image": ""},
            {"productId": 1, "amount": 2, "name": "a", "price": 1, "image": ""}
        ]"#;
        assert!(matches!(
            Cart::decode(dup),
            Err(CartDecodeError::DuplicateProduct(_))
        ));
    }

    #[test]
    fn test_serde_impl_validates_too() {
        let dup = r#"[
            {"productId": 4, "amount": 1, "name": "a", "price": 1, "image": ""},
            {"productId": 4, "amount": 1, "name": "a", "price": 1, "image": ""}
        ]"#;
        assert!(serde_json::from_str::<Cart>(dup).is_err());
    }
}
