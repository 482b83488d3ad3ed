//! Core types for QKart.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod credentials;
pub mod id;
pub mod price;
pub mod product;

pub use credentials::{CredentialsError, LoginCredentials, Registration};
pub use id::ProductId;
pub use price::{Cost, CostError, Rating, format_amount};
pub use product::{CartLineItem, CartRecord, Product};
