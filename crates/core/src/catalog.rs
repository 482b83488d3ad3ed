//! Immutable catalog snapshots.
//!
//! Each successful `GET /products` produces a new [`CatalogSnapshot`] tagged
//! with a generation number. Snapshots are shared behind `Arc` and never
//! mutated, so any number of reconciliations can read one concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{Product, ProductId};

/// One fetched generation of the product catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    generation: u64,
    products: Vec<Product>,
    /// Position of the first product with each ID.
    index: HashMap<ProductId, usize>,
}

impl CatalogSnapshot {
    /// Build a snapshot from a fetched product list.
    ///
    /// When the backend returns duplicate IDs the first occurrence wins.
    #[must_use]
    pub fn new(generation: u64, products: Vec<Product>) -> Self {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            index.entry(product.id.clone()).or_insert(position);
        }

        Self {
            generation,
            products,
            index,
        }
    }

    /// An empty snapshot (generation 0).
    #[must_use]
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    /// Wrap in an `Arc` for sharing between views.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Fetch generation this snapshot came from.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// All products in backend order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up the first product with the given ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index
            .get(id)
            .and_then(|&position| self.products.get(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cost, Rating};

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: "Sports".to_string(),
            cost: Cost::from_units(10),
            rating: Rating::new(3),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let snapshot = CatalogSnapshot::new(1, vec![product("A", "Ball"), product("B", "Bat")]);
        assert_eq!(snapshot.get(&ProductId::new("B")).map(|p| p.name.as_str()), Some("Bat"));
        assert!(snapshot.get(&ProductId::new("C")).is_none());
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.generation(), 1);
    }

    #[test]
    fn test_duplicate_ids_first_match_wins() {
        let snapshot =
            CatalogSnapshot::new(1, vec![product("A", "First"), product("A", "Second")]);
        assert_eq!(
            snapshot.get(&ProductId::new("A")).map(|p| p.name.as_str()),
            Some("First")
        );
        // Both entries remain listed
        assert_eq!(snapshot.products().len(), 2);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CatalogSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generation(), 0);
    }
}
