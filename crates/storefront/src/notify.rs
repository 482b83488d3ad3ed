//! User-facing notifications.
//!
//! Mirrors a snackbar: one notification visible at a time, duplicates of
//! the visible message are dropped, and each notification hides itself
//! after [`AUTO_HIDE`]. Every accepted notification is also kept in a
//! queue so a terminal front end can print them. The queue holds at most
//! [`PENDING_LIMIT`] entries; the oldest are dropped when nobody drains it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// How long a notification stays visible.
pub const AUTO_HIDE: Duration = Duration::from_millis(3000);

/// Undrained notifications kept before the oldest are dropped.
pub const PENDING_LIMIT: usize = 64;

/// Fixed notification texts.
pub mod messages {
    /// Catalog or search request failed without a usable backend message.
    pub const PRODUCTS_UNAVAILABLE: &str = "Could not fetch products. Check that the backend is running, reachable and returns valid JSON.";

    /// Cart fetch or update failed without a usable backend message.
    pub const CART_UNAVAILABLE: &str = "Could not fetch cart details. Check that the backend is running, reachable and returns valid JSON.";

    /// Add-to-cart for a product that already has a cart line.
    pub const ALREADY_IN_CART: &str =
        "Item already in cart. Use the cart sidebar to update quantity or remove item.";

    /// Cart operation attempted without a session token.
    pub const LOGIN_REQUIRED: &str = "Login to add an item to the Cart";

    /// Login succeeded.
    pub const LOGGED_IN: &str = "Logged in successfully";

    /// Registration succeeded.
    pub const REGISTERED: &str = "Registered successfully";

    /// Login or registration failed without a usable backend message.
    pub const AUTH_UNAVAILABLE: &str =
        "Something went wrong. Check that the backend is running, reachable and returns valid JSON";
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Success,
    Info,
    Warning,
    Error,
}

impl Variant {
    /// Lowercase label, e.g. for terminal output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub variant: Variant,
    /// Message shown to the user.
    pub message: String,
}

#[derive(Debug)]
struct State {
    visible: Option<(Notification, Instant)>,
    pending: VecDeque<Notification>,
    auto_hide: Duration,
}

/// Shared notification center.
///
/// Cheap to clone; clones post to the same queue.
#[derive(Debug, Clone)]
pub struct Notifier {
    state: Arc<Mutex<State>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    /// Create a notifier with the default auto-hide duration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_auto_hide(AUTO_HIDE)
    }

    /// Create a notifier with a custom auto-hide duration.
    #[must_use]
    pub fn with_auto_hide(auto_hide: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                visible: None,
                pending: VecDeque::new(),
                auto_hide,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show a notification.
    ///
    /// Returns `false` if the same message is still visible.
    pub fn notify(&self, variant: Variant, message: impl Into<String>) -> bool {
        let message = message.into();
        let now = Instant::now();
        let mut state = self.lock();
        let auto_hide = state.auto_hide;

        if let Some((visible, shown_at)) = &state.visible
            && visible.message == message
            && now.duration_since(*shown_at) < auto_hide
        {
            return false;
        }

        match variant {
            Variant::Success | Variant::Info => tracing::info!(%message, "notification"),
            Variant::Warning => tracing::warn!(%message, "notification"),
            Variant::Error => tracing::error!(%message, "notification"),
        }

        let notification = Notification { variant, message };
        if state.pending.len() == PENDING_LIMIT {
            state.pending.pop_front();
        }
        state.pending.push_back(notification.clone());
        state.visible = Some((notification, now));
        true
    }

    /// Show a success notification.
    pub fn success(&self, message: impl Into<String>) -> bool {
        self.notify(Variant::Success, message)
    }

    /// Show an info notification.
    pub fn info(&self, message: impl Into<String>) -> bool {
        self.notify(Variant::Info, message)
    }

    /// Show a warning notification.
    pub fn warning(&self, message: impl Into<String>) -> bool {
        self.notify(Variant::Warning, message)
    }

    /// Show an error notification.
    pub fn error(&self, message: impl Into<String>) -> bool {
        self.notify(Variant::Error, message)
    }

    /// The notification currently on screen, if it hasn't auto-hidden yet.
    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        let state = self.lock();
        state
            .visible
            .as_ref()
            .filter(|(_, shown_at)| shown_at.elapsed() < state.auto_hide)
            .map(|(notification, _)| notification.clone())
    }

    /// Take every notification posted since the last call, oldest first.
    ///
    /// Front ends should call this regularly; only the newest
    /// [`PENDING_LIMIT`] notifications are kept in between.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_visible_message_dropped() {
        let notifier = Notifier::new();
        assert!(notifier.warning("Item already in cart"));
        assert!(!notifier.warning("Item already in cart"));
        assert_eq!(notifier.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_different_message_replaces_visible() {
        let notifier = Notifier::new();
        notifier.error("first");
        notifier.success("second");

        let current = notifier.current().expect("visible");
        assert_eq!(current.message, "second");
        assert_eq!(current.variant, Variant::Success);
        assert_eq!(notifier.drain().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_hide() {
        let notifier = Notifier::new();
        notifier.info("Logged in successfully");
        assert!(notifier.current().is_some());

        tokio::time::advance(AUTO_HIDE).await;
        assert!(notifier.current().is_none());

        // Once hidden, the same message may be shown again
        assert!(notifier.info("Logged in successfully"));
    }

    #[tokio::test]
    async fn test_drain_empties_queue() {
        let notifier = Notifier::new();
        let clone = notifier.clone();
        clone.error("boom");

        let drained = notifier.drain();
        assert_eq!(
            drained,
            vec![Notification {
                variant: Variant::Error,
                message: "boom".to_string(),
            }]
        );
        assert!(notifier.drain().is_empty());
    }

    #[tokio::test]
    async fn test_undrained_queue_keeps_newest() {
        let notifier = Notifier::new();
        for i in 0..PENDING_LIMIT + 10 {
            notifier.info(format!("message {i}"));
        }

        let drained = notifier.drain();
        assert_eq!(drained.len(), PENDING_LIMIT);
        assert_eq!(drained[0].message, "message 10");
        assert_eq!(
            drained[PENDING_LIMIT - 1].message,
            format!("message {}", PENDING_LIMIT + 9)
        );
    }
}
