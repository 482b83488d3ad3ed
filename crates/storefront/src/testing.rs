//! In-memory [`StorefrontApi`] for unit tests.
//!
//! Behaves like the real backend (404 on empty search, 400 on unknown
//! product, 401 on bad token, qty 0 removes the line) and records every
//! call so tests can assert that no request was sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use qkart_core::{CartRecord, Cost, LoginCredentials, Product, ProductId, Rating};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use crate::backend::{ApiError, LoginResponse, StorefrontApi};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchProducts,
    Search(String),
    FetchCart,
    UpdateCart(ProductId, u32),
    Login(String),
    Register(String),
}

/// A scripted failure.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Backend answers with this status and optional message.
    Status(StatusCode, Option<String>),
    /// Backend answers 200 with a body that isn't JSON.
    Malformed,
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Self::Status(status, message) => ApiError::Status {
                status: *status,
                message: message.clone(),
            },
            Self::Malformed => match serde_json::from_str::<Vec<Product>>("<html>") {
                Err(e) => ApiError::Parse(e),
                Ok(_) => unreachable!("markup is not JSON"),
            },
        }
    }
}

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    cart: Vec<CartRecord>,
    users: HashMap<String, String>,
    products_failure: Option<Failure>,
    search_failure: Option<Failure>,
    cart_failure: Option<Failure>,
    update_failure: Option<Failure>,
    stall_updates: bool,
    calls: Vec<Call>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<State>>,
}

/// Build a catalog product with a whole-unit cost.
pub fn product(id: &str, cost: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        category: "General".to_string(),
        cost: Cost::from_units(cost),
        rating: Rating::new(4),
        image_url: format!("https://i.imgur.com/{id}.jpg"),
    }
}

/// Token the fake hands out for a user.
pub fn token_for(username: &str) -> String {
    format!("token-{username}")
}

impl FakeApi {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.lock().products = products;
        self
    }

    #[must_use]
    pub fn with_cart(self, cart: Vec<CartRecord>) -> Self {
        self.lock().cart = cart;
        self
    }

    #[must_use]
    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.lock()
            .users
            .insert(username.to_string(), password.to_string());
        self
    }

    pub fn fail_products(&self, failure: Option<Failure>) {
        self.lock().products_failure = failure;
    }

    pub fn fail_search(&self, failure: Option<Failure>) {
        self.lock().search_failure = failure;
    }

    pub fn fail_cart(&self, failure: Option<Failure>) {
        self.lock().cart_failure = failure;
    }

    pub fn fail_update(&self, failure: Option<Failure>) {
        self.lock().update_failure = failure;
    }

    /// Make `update_cart` record the call and then never answer.
    pub fn stall_updates(&self, stall: bool) {
        self.lock().stall_updates = stall;
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Server-side cart contents.
    pub fn cart(&self) -> Vec<CartRecord> {
        self.lock().cart.clone()
    }

    fn check_token(state: &State, token: &SecretString) -> Result<(), ApiError> {
        let known = state
            .users
            .keys()
            .any(|username| token_for(username) == token.expose_secret());
        if known {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: StatusCode::UNAUTHORIZED,
                message: Some("Protected route, Oauth2 Bearer token not found".to_string()),
            })
        }
    }
}

impl StorefrontApi for FakeApi {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let mut state = self.lock();
        state.calls.push(Call::FetchProducts);
        if let Some(failure) = &state.products_failure {
            return Err(failure.to_error());
        }
        Ok(state.products.clone())
    }

    async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let mut state = self.lock();
        state.calls.push(Call::Search(text.to_string()));
        if let Some(failure) = &state.search_failure {
            return Err(failure.to_error());
        }

        let needle = text.to_lowercase();
        let found: Vec<Product> = state
            .products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        if found.is_empty() {
            return Err(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                message: None,
            });
        }
        Ok(found)
    }

    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartRecord>, ApiError> {
        let mut state = self.lock();
        state.calls.push(Call::FetchCart);
        if let Some(failure) = &state.cart_failure {
            return Err(failure.to_error());
        }
        Self::check_token(&state, token)?;
        Ok(state.cart.clone())
    }

    async fn update_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartRecord>, ApiError> {
        let stalled = {
            let mut state = self.lock();
            state
                .calls
                .push(Call::UpdateCart(product_id.clone(), quantity));
            state.stall_updates
        };
        if stalled {
            std::future::pending::<()>().await;
        }

        let mut state = self.lock();
        if let Some(failure) = &state.update_failure {
            return Err(failure.to_error());
        }
        Self::check_token(&state, token)?;

        if !state.products.iter().any(|p| &p.id == product_id) {
            return Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                message: Some("Product doesn't exist".to_string()),
            });
        }

        let existing = state
            .cart
            .iter()
            .position(|record| &record.product_id == product_id);
        match (existing, quantity) {
            (Some(position), 0) => {
                state.cart.remove(position);
            }
            (Some(position), _) => {
                if let Some(record) = state.cart.get_mut(position) {
                    record.quantity = quantity;
                }
            }
            (None, 0) => {}
            (None, _) => state.cart.push(CartRecord::new(product_id.clone(), quantity)),
        }
        Ok(state.cart.clone())
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        let mut state = self.lock();
        state.calls.push(Call::Login(credentials.username.clone()));

        let message = match state.users.get(&credentials.username) {
            Some(password) if *password == credentials.password => {
                return Ok(LoginResponse {
                    success: true,
                    token: token_for(&credentials.username),
                    username: credentials.username.clone(),
                    balance: Decimal::from(5000),
                });
            }
            Some(_) => "Password is incorrect",
            None => "Username does not exist",
        };

        Err(ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some(message.to_string()),
        })
    }

    async fn register(&self, credentials: &LoginCredentials) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.push(Call::Register(credentials.username.clone()));

        if state.users.contains_key(&credentials.username) {
            return Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                message: Some("Username is already taken".to_string()),
            });
        }
        state
            .users
            .insert(credentials.username.clone(), credentials.password.clone());
        Ok(())
    }
}
