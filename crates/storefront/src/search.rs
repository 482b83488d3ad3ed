//! Debounced product search.
//!
//! [`SearchDebouncer`] waits for a quiet period after the last input before
//! dispatching a search. Every input aborts the pending task, so a
//! superseded timer never fires and a superseded request never reports.
//! Outcomes carry the generation of the input that produced them and
//! [`ProductListing`] ignores any that are older than the newest input.

use std::sync::Arc;
use std::time::Duration;

use qkart_core::{CatalogSnapshot, Product};
use reqwest::StatusCode;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::backend::{ApiError, StorefrontApi};
use crate::notify::{Notifier, messages};

/// Result of one dispatched search.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Generation of the input that triggered it.
    pub generation: u64,
    /// Text that was searched for.
    pub text: String,
    /// Backend answer.
    pub result: Result<Vec<Product>, ApiError>,
}

/// Restartable search timer.
#[derive(Debug)]
pub struct SearchDebouncer<A> {
    api: A,
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    outcomes: mpsc::UnboundedSender<SearchOutcome>,
}

impl<A: StorefrontApi> SearchDebouncer<A> {
    /// Create a debouncer and the channel its outcomes arrive on.
    #[must_use]
    pub fn new(api: A, delay: Duration) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (outcomes, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            api,
            delay,
            generation: 0,
            pending: None,
            outcomes,
        };
        (debouncer, receiver)
    }

    /// Register a keystroke.
    ///
    /// Restarts the quiet period; only the latest text is searched for.
    /// Returns the generation assigned to this input.
    pub fn input(&mut self, text: impl Into<String>) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let text = text.into();
        let api = self.api.clone();
        let outcomes = self.outcomes.clone();
        let delay = self.delay;

        let task = async move {
            tokio::time::sleep(delay).await;
            tracing::debug!(%text, "Dispatching search");
            let result = api.search_products(&text).await;
            let outcome = SearchOutcome {
                generation,
                text,
                result,
            };
            if outcomes.send(outcome).is_err() {
                tracing::debug!("Search listener gone, outcome dropped");
            }
        };
        self.pending = Some(tokio::spawn(
            task.instrument(tracing::debug_span!("search", generation)),
        ));
        generation
    }
}

impl<A> SearchDebouncer<A> {
    /// Drop the pending search, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// Generation of the most recent input.
    #[must_use]
    pub const fn latest_generation(&self) -> u64 {
        self.generation
    }

    /// Configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl<A> Drop for SearchDebouncer<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The product grid: the subset of the catalog currently displayed.
///
/// Independent of the cart's catalog snapshot; searches replace the
/// displayed subset only.
#[derive(Debug)]
pub struct ProductListing {
    catalog: Arc<CatalogSnapshot>,
    displayed: Vec<Product>,
    applied: u64,
    notifier: Notifier,
}

impl ProductListing {
    /// Show the full catalog.
    #[must_use]
    pub fn new(catalog: Arc<CatalogSnapshot>, notifier: Notifier) -> Self {
        Self {
            displayed: catalog.products().to_vec(),
            catalog,
            applied: 0,
            notifier,
        }
    }

    /// Products currently shown.
    #[must_use]
    pub fn displayed(&self) -> &[Product] {
        &self.displayed
    }

    /// The full catalog this listing falls back to.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<CatalogSnapshot> {
        &self.catalog
    }

    /// Apply a search outcome.
    ///
    /// `latest` is the generation of the newest input; older outcomes and
    /// outcomes not newer than the last applied one are discarded. Returns
    /// whether the outcome was applied.
    pub fn apply(&mut self, outcome: SearchOutcome, latest: u64) -> bool {
        if outcome.generation < latest || outcome.generation <= self.applied {
            tracing::debug!(
                generation = outcome.generation,
                latest,
                applied = self.applied,
                "Stale search outcome discarded"
            );
            return false;
        }
        self.applied = outcome.generation;

        match outcome.result {
            Ok(products) => {
                tracing::debug!(text = %outcome.text, results = products.len(), "Search results");
                self.displayed = products;
            }
            Err(e) if e.is_not_found() => {
                self.displayed.clear();
            }
            Err(e) if e.has_status(StatusCode::INTERNAL_SERVER_ERROR) => {
                tracing::warn!(error = %e, "Search failed, showing full catalog");
                self.notifier
                    .error(e.backend_message().unwrap_or(messages::PRODUCTS_UNAVAILABLE));
                self.displayed = self.catalog.products().to_vec();
            }
            Err(e) if e.status().is_some() => {
                tracing::warn!(error = %e, "Search rejected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Search failed");
                self.notifier.error(messages::PRODUCTS_UNAVAILABLE);
            }
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeApi, Failure, product};

    const QUIET: Duration = Duration::from_millis(500);

    fn phone() -> Product {
        let mut phone = product("P1", 300);
        phone.name = "Phone".to_string();
        phone.category = "Phones".to_string();
        phone
    }

    fn catalog() -> Arc<CatalogSnapshot> {
        CatalogSnapshot::new(1, vec![phone(), product("A", 100)]).shared()
    }

    fn outcome(generation: u64, result: Result<Vec<Product>, ApiError>) -> SearchOutcome {
        SearchOutcome {
            generation,
            text: "pho".to_string(),
            result,
        }
    }

    fn status(status: StatusCode, message: Option<&str>) -> ApiError {
        ApiError::Status {
            status,
            message: message.map(str::to_string),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_within_quiet_period_send_one_request() {
        let api = FakeApi::default().with_products(vec![phone(), product("A", 100)]);
        let (mut debouncer, mut outcomes) = SearchDebouncer::new(api.clone(), QUIET);

        debouncer.input("ph");
        tokio::time::advance(Duration::from_millis(200)).await;
        debouncer.input("pho");

        let outcome = outcomes.recv().await.unwrap();
        assert_eq!(outcome.generation, 2);
        assert_eq!(outcome.text, "pho");
        assert_eq!(outcome.result.unwrap(), vec![phone()]);
        assert_eq!(api.calls(), vec![Call::Search("pho".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_sent_before_quiet_period() {
        let api = FakeApi::default();
        let (mut debouncer, _outcomes) = SearchDebouncer::new(api.clone(), QUIET);

        debouncer.input("ph");
        tokio::time::advance(Duration::from_millis(499)).await;
        tokio::task::yield_now().await;

        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_search() {
        let api = FakeApi::default();
        let (mut debouncer, _outcomes) = SearchDebouncer::new(api.clone(), QUIET);

        debouncer.input("ph");
        debouncer.cancel();
        tokio::time::advance(QUIET * 2).await;
        tokio::task::yield_now().await;

        assert!(api.calls().is_empty());
        assert_eq!(debouncer.latest_generation(), 1);
    }

    #[test]
    fn test_listing_starts_with_full_catalog() {
        let listing = ProductListing::new(catalog(), Notifier::new());
        assert_eq!(listing.displayed().len(), 2);
    }

    #[test]
    fn test_results_replace_display() {
        let mut listing = ProductListing::new(catalog(), Notifier::new());
        assert!(listing.apply(outcome(1, Ok(vec![phone()])), 1));
        assert_eq!(listing.displayed(), &[phone()]);
        // Catalog untouched
        assert_eq!(listing.catalog().len(), 2);
    }

    #[test]
    fn test_stale_outcome_discarded() {
        let mut listing = ProductListing::new(catalog(), Notifier::new());

        assert!(!listing.apply(outcome(1, Ok(Vec::new())), 2));
        assert_eq!(listing.displayed().len(), 2);

        assert!(listing.apply(outcome(2, Ok(vec![phone()])), 2));
        assert!(!listing.apply(outcome(2, Ok(Vec::new())), 2));
        assert_eq!(listing.displayed(), &[phone()]);
    }

    #[tokio::test]
    async fn test_not_found_empties_display() {
        let notifier = Notifier::new();
        let mut listing = ProductListing::new(catalog(), notifier.clone());

        listing.apply(outcome(1, Err(status(StatusCode::NOT_FOUND, None))), 1);

        assert!(listing.displayed().is_empty());
        assert!(notifier.drain().is_empty());
    }

    #[tokio::test]
    async fn test_server_fault_falls_back_to_full_catalog() {
        let notifier = Notifier::new();
        let mut listing = ProductListing::new(catalog(), notifier.clone());
        listing.apply(outcome(1, Ok(vec![phone()])), 1);

        listing.apply(
            outcome(
                2,
                Err(status(StatusCode::INTERNAL_SERVER_ERROR, Some("Search index down"))),
            ),
            2,
        );

        assert_eq!(listing.displayed().len(), 2);
        assert_eq!(notifier.drain()[0].message, "Search index down");
    }

    #[tokio::test]
    async fn test_other_fault_leaves_display_untouched() {
        let api = FakeApi::default();
        api.fail_search(Some(Failure::Malformed));
        let result = api.search_products("pho").await;

        let notifier = Notifier::new();
        let mut listing = ProductListing::new(catalog(), notifier.clone());
        listing.apply(outcome(1, Ok(vec![phone()])), 1);
        listing.apply(outcome(2, result), 2);

        assert_eq!(listing.displayed(), &[phone()]);
        assert_eq!(notifier.drain()[0].message, messages::PRODUCTS_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_rejected_search_is_silent() {
        let notifier = Notifier::new();
        let mut listing = ProductListing::new(catalog(), notifier.clone());
        listing.apply(outcome(1, Ok(vec![phone()])), 1);

        listing.apply(
            outcome(2, Err(status(StatusCode::BAD_REQUEST, Some("Invalid query")))),
            2,
        );

        assert_eq!(listing.displayed(), &[phone()]);
        assert!(notifier.drain().is_empty());
    }
}
