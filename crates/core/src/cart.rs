//! Cart reconciliation and pricing.
//!
//! The backend only stores `(productId, qty)` pairs. Reconciliation joins
//! them against the catalog to produce display-ready [`CartLineItem`]s, and
//! the pricing helpers derive totals from those line items.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::CatalogSnapshot;
use crate::types::{CartLineItem, CartRecord, Product, ProductId, format_amount};

/// Join cart records with a product list.
///
/// Output preserves the order of `records`. Each record is matched to the
/// first product whose ID equals its `product_id`; records with no match are
/// dropped (the product is no longer orderable). Inputs are left untouched.
#[must_use]
pub fn reconcile(records: &[CartRecord], products: &[Product]) -> Vec<CartLineItem> {
    records
        .iter()
        .filter_map(|record| {
            products
                .iter()
                .find(|product| product.id == record.product_id)
                .map(|product| line_item(product, record))
        })
        .collect()
}

impl CatalogSnapshot {
    /// Join cart records with this snapshot.
    ///
    /// Same semantics as [`reconcile`], using the snapshot's ID index.
    #[must_use]
    pub fn reconcile(&self, records: &[CartRecord]) -> Vec<CartLineItem> {
        records
            .iter()
            .filter_map(|record| {
                self.get(&record.product_id)
                    .map(|product| line_item(product, record))
            })
            .collect()
    }
}

fn line_item(product: &Product, record: &CartRecord) -> CartLineItem {
    CartLineItem {
        product: product.clone(),
        quantity: record.quantity,
    }
}

/// Total value of the cart.
///
/// Sums `cost * quantity` over items with a positive quantity. Returns zero
/// for an empty cart.
#[must_use]
pub fn total_cart_value(items: &[CartLineItem]) -> Decimal {
    items
        .iter()
        .filter(|item| item.quantity > 0)
        .map(|item| item.cost().times(item.quantity))
        .sum()
}

/// Total number of units across all line items.
#[must_use]
pub fn total_quantity(items: &[CartLineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Whether a product already has a line in the cart.
#[must_use]
pub fn is_item_in_cart(items: &[CartLineItem], product_id: &ProductId) -> bool {
    items.iter().any(|item| item.product_id() == product_id)
}

/// Read-only order totals shown at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    /// Total units in the cart.
    pub products: u64,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Shipping charges (always free).
    pub shipping: Decimal,
    /// Amount payable.
    pub total: Decimal,
}

impl OrderSummary {
    /// Summarize a reconciled cart.
    #[must_use]
    pub fn from_items(items: &[CartLineItem]) -> Self {
        let subtotal = total_cart_value(items);
        let shipping = Decimal::ZERO;
        Self {
            products: total_quantity(items),
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

impl core::fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Order Details")?;
        writeln!(f, "  Products          {}", self.products)?;
        writeln!(f, "  Subtotal          {}", format_amount(self.subtotal))?;
        writeln!(f, "  Shipping Charges  {}", format_amount(self.shipping))?;
        write!(f, "  Total             {}", format_amount(self.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cost, Rating};

    fn product(id: &str, cost: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Phones".to_string(),
            cost: Cost::from_units(cost),
            rating: Rating::new(4),
            image_url: format!("https://i.imgur.com/{id}.jpg"),
        }
    }

    #[test]
    fn test_single_item_priced() {
        let catalog = vec![product("A", 100)];
        let cart = vec![CartRecord::new("A", 2)];

        let items = reconcile(&cart, &catalog);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id().as_str(), "A");
        assert_eq!(items[0].cost(), Cost::from_units(100));
        assert_eq!(items[0].quantity, 2);
        assert_eq!(total_cart_value(&items), Decimal::from(200));
    }

    #[test]
    fn test_unknown_product_dropped() {
        let catalog = vec![product("A", 50)];
        let cart = vec![CartRecord::new("B", 1)];

        let items = reconcile(&cart, &catalog);
        assert!(items.is_empty());
        assert_eq!(total_cart_value(&items), Decimal::ZERO);
    }

    #[test]
    fn test_zero_quantity_listed_but_not_priced() {
        let catalog = vec![product("A", 50), product("B", 10)];
        let cart = vec![CartRecord::new("A", 0), CartRecord::new("B", 3)];

        let items = reconcile(&cart, &catalog);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 0);
        assert_eq!(total_cart_value(&items), Decimal::from(30));
    }

    #[test]
    fn test_order_follows_cart_records() {
        let catalog = vec![product("A", 1), product("B", 2), product("C", 3)];
        let cart = vec![
            CartRecord::new("C", 1),
            CartRecord::new("A", 1),
            CartRecord::new("B", 1),
        ];

        let ids: Vec<_> = reconcile(&cart, &catalog)
            .iter()
            .map(|item| item.product_id().to_string())
            .collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_unresolved_records_are_set_difference() {
        let catalog = vec![product("A", 1), product("C", 3)];
        let cart = vec![
            CartRecord::new("A", 1),
            CartRecord::new("B", 1),
            CartRecord::new("C", 1),
            CartRecord::new("D", 1),
        ];

        let ids: Vec<_> = reconcile(&cart, &catalog)
            .iter()
            .map(|item| item.product_id().to_string())
            .collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[test]
    fn test_empty_inputs() {
        let catalog = vec![product("A", 1)];
        assert!(reconcile(&[], &catalog).is_empty());
        assert!(reconcile(&[CartRecord::new("A", 1)], &[]).is_empty());
        assert_eq!(total_cart_value(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_catalog_ids_first_match() {
        let mut second = product("A", 999);
        second.name = "Shadowed".to_string();
        let catalog = vec![product("A", 5), second];

        let items = reconcile(&[CartRecord::new("A", 1)], &catalog);
        assert_eq!(items[0].product.name, "Product A");
        assert_eq!(total_cart_value(&items), Decimal::from(5));
    }

    #[test]
    fn test_reconcile_is_idempotent_and_pure() {
        let catalog = vec![product("A", 100), product("B", 7)];
        let cart = vec![CartRecord::new("B", 4), CartRecord::new("A", 2)];
        let catalog_before = catalog.clone();

        let first = reconcile(&cart, &catalog);
        let second = reconcile(&cart, &catalog);
        assert_eq!(first, second);
        assert_eq!(catalog, catalog_before);
    }

    #[test]
    fn test_snapshot_reconcile_matches_slice_reconcile() {
        let products = vec![product("A", 100), product("B", 7), product("A", 1)];
        let snapshot = CatalogSnapshot::new(3, products.clone());
        let cart = vec![
            CartRecord::new("B", 4),
            CartRecord::new("Z", 1),
            CartRecord::new("A", 2),
        ];

        assert_eq!(snapshot.reconcile(&cart), reconcile(&cart, &products));
    }

    #[test]
    fn test_total_matches_manual_sum() {
        let catalog: Vec<_> = (1..=20).map(|i| product(&format!("P{i}"), i)).collect();
        let cart: Vec<_> = (1..=20)
            .map(|i| CartRecord::new(format!("P{i}").as_str(), i % 4))
            .collect();

        let items = reconcile(&cart, &catalog);
        let expected: u32 = (1..=20).map(|i| i * (i % 4)).sum();
        assert_eq!(total_cart_value(&items), Decimal::from(expected));
        assert!(total_cart_value(&items) >= Decimal::ZERO);
    }

    #[test]
    fn test_is_item_in_cart() {
        let items = reconcile(&[CartRecord::new("A", 1)], &[product("A", 1)]);
        assert!(is_item_in_cart(&items, &ProductId::new("A")));
        assert!(!is_item_in_cart(&items, &ProductId::new("B")));
    }

    #[test]
    fn test_order_summary() {
        let catalog = vec![product("A", 100), product("B", 25)];
        let items = reconcile(
            &[CartRecord::new("A", 2), CartRecord::new("B", 1)],
            &catalog,
        );

        let summary = OrderSummary::from_items(&items);
        assert_eq!(summary.products, 3);
        assert_eq!(summary.subtotal, Decimal::from(225));
        assert_eq!(summary.shipping, Decimal::ZERO);
        assert_eq!(summary.total, Decimal::from(225));
        assert!(summary.to_string().contains("$225.00"));
    }
}
