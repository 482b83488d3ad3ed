//! Catalog and cart record types.
//!
//! Field names follow the backend's JSON (`_id`, `image`, `productId`, `qty`).

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{Cost, Rating};

/// A purchasable product, as returned by `GET /products`.
///
/// Owned by the backend and never modified client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Category the product belongs to.
    pub category: String,
    /// Unit cost.
    pub cost: Cost,
    /// Aggregate rating out of five.
    #[serde(default)]
    pub rating: Rating,
    /// Product image URL.
    #[serde(rename = "image", default)]
    pub image_url: String,
}

/// One line of a user's cart as held by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    /// Product this line refers to.
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// Number of units.
    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl CartRecord {
    /// Create a cart record.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A cart record joined with its product.
///
/// Built fresh on every reconciliation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineItem {
    /// Full product attributes.
    #[serde(flatten)]
    pub product: Product,
    /// Number of units in the cart.
    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl CartLineItem {
    /// Product ID of this line.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Unit cost of this line.
    #[must_use]
    pub const fn cost(&self) -> Cost {
        self.product.cost
    }
}
