//! Cart view state machine.
//!
//! Drives catalog fetch, cart fetch, reconciliation and quantity changes.
//! The catalog is held as an immutable [`CatalogSnapshot`] per fetch, and
//! line items are rebuilt from the backend's authoritative record list after
//! every successful mutation. Faults never escape: each one becomes a
//! notification and the view stays interactive.
//!
//! Mutations take `&mut self`, so one view never has two requests in
//! flight. Dropping a pending mutation discards its response and puts the
//! view back in the state it had before the request.

use std::sync::Arc;

use qkart_core::{
    CartLineItem, CartRecord, CatalogSnapshot, OrderSummary, ProductId, is_item_in_cart,
    total_cart_value,
};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::backend::{ApiError, StorefrontApi};
use crate::error::add_breadcrumb;
use crate::notify::{Notifier, messages};
use crate::session::Session;

/// Where the view currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewState {
    /// Catalog not loaded yet, or its fetch failed.
    Loading,
    /// Catalog loaded, no token so the cart was never fetched.
    Unauthenticated,
    /// Catalog and cart loaded, zero line items.
    Empty,
    /// Catalog and cart loaded, at least one line item.
    Ready,
    /// A cart mutation is in flight.
    Mutating,
}

/// Stateful cart view over a [`StorefrontApi`].
#[derive(Debug)]
pub struct CartView<A> {
    api: A,
    session: Session,
    notifier: Notifier,
    catalog: Option<Arc<CatalogSnapshot>>,
    generation: u64,
    items: Vec<CartLineItem>,
    state: ViewState,
}

impl<A: StorefrontApi> CartView<A> {
    /// Create a view in the `Loading` state.
    pub fn new(api: A, session: Session, notifier: Notifier) -> Self {
        Self {
            api,
            session,
            notifier,
            catalog: None,
            generation: 0,
            items: Vec::new(),
            state: ViewState::Loading,
        }
    }

    /// Fetch the catalog, then the cart if a token is present.
    ///
    /// Returns the new catalog snapshot, or `None` if the catalog fetch
    /// failed (the view stays in `Loading`). Calling it again retries.
    #[instrument(skip(self))]
    pub async fn mount(&mut self) -> Option<Arc<CatalogSnapshot>> {
        let products = match self.api.fetch_products().await {
            Ok(products) => products,
            Err(e) => {
                notify_catalog_failure(&self.notifier, &e);
                return None;
            }
        };

        self.generation += 1;
        let snapshot = CatalogSnapshot::new(self.generation, products).shared();
        tracing::debug!(
            generation = snapshot.generation(),
            products = snapshot.len(),
            "Catalog loaded"
        );
        self.catalog = Some(Arc::clone(&snapshot));
        self.fetch_cart().await;
        Some(snapshot)
    }

    /// Fetch the cart and rebuild line items against the current catalog.
    ///
    /// Skipped entirely without a token or before the catalog has loaded.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&mut self) {
        if self.catalog.is_none() {
            return;
        }
        let Some(token) = self.session.token() else {
            self.items.clear();
            self.state = ViewState::Unauthenticated;
            return;
        };

        match self.api.fetch_cart(token).await {
            Ok(records) => self.apply_records(&records),
            Err(e) => {
                notify_cart_failure(&self.notifier, &e);
                self.items.clear();
            }
        }
        self.settle();
    }

    /// Add a product with quantity 1.
    ///
    /// Rejected locally with a notification when logged out or when the
    /// product already has a line; use [`Self::set_quantity`] for those.
    /// Returns `true` when the backend accepted the change.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&mut self, product_id: &ProductId) -> bool {
        if !self.session.is_authenticated() {
            self.notifier.error(messages::LOGIN_REQUIRED);
            return false;
        }
        if is_item_in_cart(&self.items, product_id) {
            self.notifier.warning(messages::ALREADY_IN_CART);
            return false;
        }
        self.mutate(product_id, 1).await
    }

    /// Set the absolute quantity of a product.
    ///
    /// A quantity below zero is dropped silently, as is one too large for
    /// the backend. Zero removes the line.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn set_quantity(&mut self, product_id: &ProductId, requested: i64) -> bool {
        let Ok(quantity) = u32::try_from(requested) else {
            tracing::debug!(requested, "Quantity out of range, ignored");
            return false;
        };
        if !self.session.is_authenticated() {
            self.notifier.error(messages::LOGIN_REQUIRED);
            return false;
        }
        self.mutate(product_id, quantity).await
    }

    /// Stepper "+".
    pub async fn increment(&mut self, product_id: &ProductId) -> bool {
        let next = i64::from(self.quantity_of(product_id)) + 1;
        self.set_quantity(product_id, next).await
    }

    /// Stepper "-".
    pub async fn decrement(&mut self, product_id: &ProductId) -> bool {
        let next = i64::from(self.quantity_of(product_id)) - 1;
        self.set_quantity(product_id, next).await
    }

    async fn mutate(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        if self.catalog.is_none() {
            tracing::debug!("Catalog not loaded, cart change ignored");
            return false;
        }
        let Some(token) = self.session.token() else {
            return false;
        };

        add_breadcrumb(
            "cart",
            "Set quantity",
            Some(&[
                ("product_id", product_id.as_str()),
                ("qty", &quantity.to_string()),
            ]),
        );

        let result = {
            let _pending = PendingMutation::begin(&mut self.state);
            self.api.update_cart(token, product_id, quantity).await
        };
        let accepted = match result {
            Ok(records) => {
                self.apply_records(&records);
                true
            }
            Err(e) => {
                notify_cart_failure(&self.notifier, &e);
                false
            }
        };
        self.settle();
        accepted
    }

    fn apply_records(&mut self, records: &[CartRecord]) {
        self.items = self
            .catalog
            .as_deref()
            .map(|catalog| catalog.reconcile(records))
            .unwrap_or_default();
        tracing::debug!(
            records = records.len(),
            items = self.items.len(),
            "Cart reconciled"
        );
    }

    fn settle(&mut self) {
        self.state = if self.items.is_empty() {
            ViewState::Empty
        } else {
            ViewState::Ready
        };
    }

    fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id() == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ViewState {
        self.state
    }

    /// Reconciled line items, in cart order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Sum of cost × quantity over the line items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        total_cart_value(&self.items)
    }

    /// Checkout totals for the current cart.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        OrderSummary::from_items(&self.items)
    }

    /// The catalog snapshot the line items were built from.
    #[must_use]
    pub fn catalog(&self) -> Option<&Arc<CatalogSnapshot>> {
        self.catalog.as_ref()
    }

    /// The session this view was opened with.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }
}

/// Holds the view in `Mutating` while a request is in flight.
///
/// Dropping it, on completion or cancellation, restores the prior state.
struct PendingMutation<'a> {
    state: &'a mut ViewState,
    previous: ViewState,
}

impl<'a> PendingMutation<'a> {
    const fn begin(state: &'a mut ViewState) -> Self {
        let previous = std::mem::replace(state, ViewState::Mutating);
        Self { state, previous }
    }
}

impl Drop for PendingMutation<'_> {
    fn drop(&mut self) {
        *self.state = self.previous;
    }
}

/// Notify a catalog fetch fault.
///
/// A 500 carries its own message; anything else gets the generic text.
pub(crate) fn notify_catalog_failure(notifier: &Notifier, error: &ApiError) {
    tracing::warn!(error = %error, "Catalog fetch failed");
    match (error.status(), error.backend_message()) {
        (Some(StatusCode::INTERNAL_SERVER_ERROR), Some(message)) => notifier.error(message),
        _ => notifier.error(messages::PRODUCTS_UNAVAILABLE),
    };
}

fn notify_cart_failure(notifier: &Notifier, error: &ApiError) {
    tracing::warn!(error = %error, "Cart request failed");
    match (error.status(), error.backend_message()) {
        (Some(StatusCode::BAD_REQUEST), Some(message)) => notifier.error(message),
        _ => notifier.error(messages::CART_UNAVAILABLE),
    };
}
