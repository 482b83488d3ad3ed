//! QKart backend REST API.
//!
//! # Architecture
//!
//! - [`StorefrontApi`] is the seam the views depend on; [`BackendClient`]
//!   implements it over `reqwest`, tests substitute an in-memory fake
//! - The backend is the source of truth for the cart - every successful
//!   mutation returns the full updated cart
//! - Plain JSON over HTTP; the bearer token is opaque and backend-issued
//!
//! # Endpoints
//!
//! - `GET  /products` - full catalog
//! - `GET  /products/search?value=<text>` - filtered catalog (404 when nothing matches)
//! - `GET  /cart` - cart records (bearer auth)
//! - `POST /cart` - set `{productId, qty}` and return the updated cart (bearer auth)
//! - `POST /auth/login` - exchange credentials for a token
//! - `POST /auth/register` - create an account

mod client;
pub mod types;

pub use client::{BackendClient, REQUEST_ID_HEADER};
pub use types::*;

use std::future::Future;

use qkart_core::{CartRecord, LoginCredentials, Product, ProductId};
use reqwest::StatusCode;
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (unreachable, timeout, connection reset).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {}", message.as_deref().unwrap_or("(no message)"))]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// `message` from the backend's `{success: false, message}` body, if any.
        message: Option<String>,
    },

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The HTTP status, when the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The structured message the backend sent with a failure, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the backend answered with the given status.
    #[must_use]
    pub fn has_status(&self, expected: StatusCode) -> bool {
        self.status() == Some(expected)
    }

    /// Backend reported 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.has_status(StatusCode::NOT_FOUND)
    }
}

/// Operations the storefront needs from the backend.
///
/// Implementations must be cheap to clone so debounced searches can run on
/// their own task.
pub trait StorefrontApi: Clone + Send + Sync + 'static {
    /// Fetch the full catalog.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Search the catalog by name or category.
    fn search_products(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Fetch the cart records of the authenticated user.
    fn fetch_cart(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Vec<CartRecord>, ApiError>> + Send;

    /// Set the absolute quantity of a product in the cart.
    ///
    /// Returns the full updated cart.
    fn update_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<Vec<CartRecord>, ApiError>> + Send;

    /// Exchange credentials for a session token.
    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// Create a new account.
    fn register(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("Product doesn't exist".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Backend returned 400 Bad Request: Product doesn't exist"
        );
        assert_eq!(err.backend_message(), Some("Product doesn't exist"));
    }

    #[test]
    fn test_status_error_without_message() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(
            err.to_string(),
            "Backend returned 500 Internal Server Error: (no message)"
        );
        assert!(err.backend_message().is_none());
    }

    #[test]
    fn test_not_found_classification() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: None,
        };
        assert!(err.is_not_found());
        assert!(!err.has_status(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_parse_error_has_no_status() {
        let parse = serde_json::from_str::<Vec<Product>>("<html>").unwrap_err();
        let err = ApiError::from(parse);
        assert!(err.status().is_none());
        assert!(err.backend_message().is_none());
    }
}
