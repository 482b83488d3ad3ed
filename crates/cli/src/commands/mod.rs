//! CLI commands.
//!
//! Every command builds what it needs from a [`Context`], runs one flow of
//! the storefront library and prints the notifications it produced.

pub mod account;
pub mod browse;
pub mod cart;
pub mod products;

use qkart_storefront::backend::BackendClient;
use qkart_storefront::cart_view::CartView;
use qkart_storefront::config::StorefrontConfig;
use qkart_storefront::error::StorefrontError;
use qkart_storefront::notify::Notifier;
use qkart_storefront::session::{Session, SessionStore};
use thiserror::Error;

use crate::output;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Storefront library error.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Reading terminal input failed.
    #[error("Input error: {0}")]
    Input(#[from] std::io::Error),
}

impl CommandError {
    /// Report to Sentry where the library considers it an incident.
    pub fn report(&self) {
        if let Self::Storefront(e) = self {
            e.report();
        }
    }
}

/// Shared command state.
#[derive(Debug)]
pub struct Context {
    config: StorefrontConfig,
    store: SessionStore,
    notifier: Notifier,
}

impl Context {
    pub fn new(config: StorefrontConfig) -> Self {
        let store = SessionStore::new(config.session_file.clone());
        Self {
            config,
            store,
            notifier: Notifier::new(),
        }
    }

    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn client(&self) -> Result<BackendClient, StorefrontError> {
        Ok(BackendClient::new(&self.config.backend)?)
    }

    pub fn session(&self) -> Result<Session, StorefrontError> {
        Ok(self.store.load()?)
    }

    /// The stored session, or `NotLoggedIn`.
    pub fn require_session(&self) -> Result<Session, StorefrontError> {
        let session = self.session()?;
        if session.is_authenticated() {
            Ok(session)
        } else {
            Err(StorefrontError::NotLoggedIn)
        }
    }

    /// Open a cart view on the stored session and load catalog and cart.
    ///
    /// Returns `None` when the catalog could not be loaded.
    pub async fn mounted_view(
        &self,
        session: Session,
    ) -> Result<Option<CartView<BackendClient>>, StorefrontError> {
        let mut view = CartView::new(self.client()?, session, self.notifier.clone());
        let mounted = view.mount().await.is_some();
        self.flush();
        Ok(mounted.then_some(view))
    }

    /// Print pending notifications.
    pub fn flush(&self) {
        output::notifications(&self.notifier.drain());
    }
}
