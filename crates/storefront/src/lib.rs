//! Rocket Shoes Storefront library.
//!
//! This crate provides the cart engine and its JSON API as a library,
//! allowing it to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod storage;
