//! Unified error handling with Sentry integration.
//!
//! Views never surface these to the user directly: faults are converted into
//! notifications at the view boundary. `StorefrontError` is what the
//! non-view entry points (configuration, session persistence, client
//! construction) return.

use thiserror::Error;

use crate::backend::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Session file could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Operation requires a logged-in user.
    #[error("Not logged in")]
    NotLoggedIn,
}

impl StorefrontError {
    /// Capture this error to Sentry and log it.
    ///
    /// Only backend and session faults are reported; configuration and
    /// login-state errors are user mistakes, not incidents.
    pub fn report(&self) {
        if matches!(self, Self::Api(_) | Self::Session(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context from a username.
///
/// Call this after successful login to associate errors with users.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Set quantity", Some(&[("product_id", "KCRwjF7lN97HnEaY")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
