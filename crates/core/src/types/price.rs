//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog price in the store's currency.
///
/// Serialized as a plain JSON number (e.g. `179.90`) so that the catalog API
/// and the persisted cart share one representation. The number is written
/// with the decimal's exact digits and read back without passing through
/// `f64`, so a stored price decodes to the value that was written.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::arbitrary_precision")] Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| Self(acc.0 + p.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(17990).amount(), Decimal::new(17990, 2));
        assert_eq!(Price::from_cents(0), Price::ZERO);
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::from_cents(17990).display(), "$179.90");
        assert_eq!(Price::new(Decimal::new(5, 0)).to_string(), "$5.00");
    }

    #[test]
    fn test_times_and_sum() {
        let line = Price::from_cents(1999).times(3);
        assert_eq!(line, Price::from_cents(5997));

        let total: Price = [Price::from_cents(100), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(350));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Price::from_cents(17990)).unwrap();
        assert_eq!(json, "179.90");

        let parsed: Price = serde_json::from_str("139.9").unwrap();
        assert_eq!(parsed, Price::from_cents(13990));

        let whole: Price = serde_json::from_str("100").unwrap();
        assert_eq!(whole, Price::from_cents(10000));
    }

    #[test]
    fn test_high_precision_survives_json() {
        let exact = Price::new(Decimal::from_str_exact("12345678901234567.89").unwrap());

        let json = serde_json::to_string(&exact).unwrap();
        assert_eq!(json, "12345678901234567.89");

        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, exact);
        assert_eq!(back.amount().to_string(), "12345678901234567.89");
    }

    #[test]
    fn test_long_catalog_fraction_is_exact() {
        let parsed: Price = serde_json::from_str("0.1000000000000000055511151231").unwrap();
        assert_eq!(
            parsed.amount(),
            Decimal::from_str_exact("0.1000000000000000055511151231").unwrap()
        );
    }
}
