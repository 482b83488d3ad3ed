//! QKart Core - Shared catalog, cart and pricing library.
//!
//! This crate provides the types and derivations used across QKart components:
//! - `storefront` - Backend API client, session handling and view state machines
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, costs, ratings, products and credentials
//! - [`catalog`] - Immutable, generation-tagged catalog snapshots
//! - [`cart`] - Cart reconciliation and pricing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{OrderSummary, is_item_in_cart, reconcile, total_cart_value, total_quantity};
pub use catalog::CatalogSnapshot;
pub use types::*;
