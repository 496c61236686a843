//! Core types for Rocket Shoes.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;

pub use cart::{Cart, CartDecodeError, CartEntry};
pub use catalog::{Product, StockRecord};
pub use id::*;
pub use price::Price;
