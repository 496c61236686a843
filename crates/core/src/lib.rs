//! Rocket Shoes Core - Shared types library.
//!
//! This crate provides the types shared by every Rocket Shoes component:
//! - `storefront` - Cart engine, catalog client and JSON API
//! - `cli` - Command-line cart management
//!
//! # Architecture
//!
//! The core crate contains only types and pure cart transformations - no I/O,
//! no storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, catalog records and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
