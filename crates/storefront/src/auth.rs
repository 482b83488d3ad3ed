//! Login, registration and logout flows.
//!
//! Input is validated locally first; nothing is sent to the backend until
//! the form passes. Every outcome, good or bad, ends in a notification.

use qkart_core::{CredentialsError, LoginCredentials, Registration};
use reqwest::StatusCode;
use tracing::instrument;

use crate::backend::{ApiError, StorefrontApi};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::notify::{Notifier, messages};
use crate::session::{Session, SessionError, SessionStore};

/// Log in and persist the resulting session.
///
/// Returns the new session on success, `None` if validation or the request
/// failed (the reason has been notified).
#[instrument(skip(api, store, notifier, password))]
pub async fn login<A: StorefrontApi>(
    api: &A,
    store: &SessionStore,
    notifier: &Notifier,
    username: &str,
    password: &str,
) -> Option<Session> {
    let credentials = match LoginCredentials::parse(username, password) {
        Ok(credentials) => credentials,
        Err(e) => {
            notify_invalid(notifier, &e);
            return None;
        }
    };

    match api.login(&credentials).await {
        Ok(response) => {
            let session = Session::authenticated(
                response.token,
                response.username,
                response.balance.to_string(),
            );
            if let Err(e) = store.save(&session) {
                tracing::error!(error = %e, "Failed to persist session");
                notifier.error(format!("Logged in, but the session could not be saved: {e}"));
            } else {
                notifier.success(messages::LOGGED_IN);
            }
            if let Some(username) = session.username() {
                set_sentry_user(username);
            }
            Some(session)
        }
        Err(e) => {
            notify_auth_failure(notifier, &e);
            None
        }
    }
}

/// Register a new account.
///
/// Returns `true` when the backend accepted the registration.
#[instrument(skip(api, notifier, password, confirm_password))]
pub async fn register<A: StorefrontApi>(
    api: &A,
    notifier: &Notifier,
    username: &str,
    password: &str,
    confirm_password: &str,
) -> bool {
    let registration = match Registration::parse(username, password, confirm_password) {
        Ok(registration) => registration,
        Err(e) => {
            notify_invalid(notifier, &e);
            return false;
        }
    };

    match api.register(registration.credentials()).await {
        Ok(()) => {
            notifier.success(messages::REGISTERED);
            true
        }
        Err(e) => {
            notify_auth_failure(notifier, &e);
            false
        }
    }
}

/// Forget the persisted session.
///
/// # Errors
///
/// Returns an error if the session file can't be removed.
pub fn logout(store: &SessionStore) -> Result<Session, SessionError> {
    store.clear()?;
    clear_sentry_user();
    tracing::info!("Logged out");
    Ok(Session::anonymous())
}

fn notify_invalid(notifier: &Notifier, error: &CredentialsError) {
    // Blank form is a prompt, not a mistake
    if matches!(error, CredentialsError::Blank) {
        notifier.info(error.to_string());
    } else {
        notifier.warning(error.to_string());
    }
}

fn notify_auth_failure(notifier: &Notifier, error: &ApiError) {
    match (error.status(), error.backend_message()) {
        (Some(StatusCode::BAD_REQUEST), Some(message)) => {
            notifier.error(message);
        }
        _ => {
            notifier.warning(messages::AUTH_UNAVAILABLE);
        }
    }
}
