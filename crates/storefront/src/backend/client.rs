//! `reqwest` implementation of [`StorefrontApi`].
//!
//! Every request carries a fresh `x-request-id` (UUID v4) that is also
//! recorded on the tracing span, so client logs can be matched with backend
//! logs.

use std::sync::Arc;

use qkart_core::{CartRecord, LoginCredentials, Product, ProductId};
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{Span, debug, instrument};
use url::Url;
use uuid::Uuid;

use super::{ApiError, CartUpdate, ErrorBody, LoginResponse, StorefrontApi};
use crate::config::BackendConfig;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client for the QKart backend.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client can't be built (e.g.
    /// the TLS backend fails to initialize).
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode a JSON success body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        let response = request
            .header(REQUEST_ID_HEADER, &request_id)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&response_text)
                .ok()
                .and_then(|body| body.message);
            debug!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status { status, message });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }
}

impl StorefrontApi for BackendClient {
    #[instrument(skip(self), fields(request_id))]
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint("products")?;
        let products: Vec<Product> = self.send(self.inner.client.get(url)).await?;
        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }

    #[instrument(skip(self), fields(request_id))]
    async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint("products/search")?;
        let request = self.inner.client.get(url).query(&[("value", text)]);
        let products: Vec<Product> = self.send(request).await?;
        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    #[instrument(skip(self, token), fields(request_id))]
    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartRecord>, ApiError> {
        let url = self.endpoint("cart")?;
        let request = self
            .inner
            .client
            .get(url)
            .bearer_auth(token.expose_secret());
        self.send(request).await
    }

    #[instrument(skip(self, token), fields(product_id = %product_id, request_id))]
    async fn update_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartRecord>, ApiError> {
        let url = self.endpoint("cart")?;
        let body = CartUpdate {
            product_id: product_id.clone(),
            quantity,
        };
        let request = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&body);
        self.send(request).await
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username, request_id))]
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("auth/login")?;
        self.send(self.inner.client.post(url).json(credentials))
            .await
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username, request_id))]
    async fn register(&self, credentials: &LoginCredentials) -> Result<(), ApiError> {
        let url = self.endpoint("auth/register")?;
        // Body content is irrelevant on success
        let _: serde_json::Value = self
            .send(self.inner.client.post(url).json(credentials))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&BackendConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_beneath_base_path() {
        let client = client("http://localhost:8082/api/v1");
        assert_eq!(
            client.endpoint("products/search").unwrap().as_str(),
            "http://localhost:8082/api/v1/products/search"
        );
        assert_eq!(
            client.endpoint("auth/login").unwrap().as_str(),
            "http://localhost:8082/api/v1/auth/login"
        );
    }

    #[test]
    fn test_debug_shows_base_url() {
        let client = client("http://localhost:8082/api/v1");
        let debug = format!("{client:?}");
        assert!(debug.contains("http://localhost:8082/api/v1/"));
    }
}
