//! Integration tests for QKart.
//!
//! Hosts an in-process mock of the QKart REST backend so the real
//! [`BackendClient`](qkart_storefront::backend::BackendClient) can be
//! exercised over HTTP without an external server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```
//!
//! # Mock Behavior
//!
//! - Routes live under `/api/v1`, like the real backend
//! - `GET /products/search` matches name or category, case-insensitive,
//!   and answers 404 when nothing matches
//! - Carts are per user, keyed by the bearer token issued at login
//! - `POST /cart` with `qty: 0` removes the line
//! - Faults can be injected per route with [`MockBackend::fail`]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use qkart_core::{CartRecord, Cost, LoginCredentials, Product, ProductId, Rating};
use qkart_storefront::backend::{BackendClient, REQUEST_ID_HEADER};
use qkart_storefront::config::BackendConfig;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// Balance every mock account starts with.
pub const STARTING_BALANCE: u32 = 5000;

/// Route a fault can be injected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Products,
    Search,
    Cart,
    Login,
    Register,
}

/// Injected fault.
#[derive(Debug, Clone)]
pub enum Fault {
    /// Answer with this status and an optional `{success: false, message}` body.
    Status(StatusCode, Option<String>),
    /// Answer 200 with an HTML page instead of JSON.
    Malformed,
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        match self {
            Self::Status(status, Some(message)) => error_response(status, &message),
            Self::Status(status, None) => status.into_response(),
            Self::Malformed => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html")],
                "<html><body>Bad Gateway</body></html>",
            )
                .into_response(),
        }
    }
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, e.g. `/api/v1/products/search?value=ear`.
    pub uri: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    products: Vec<Product>,
    users: HashMap<String, String>,
    tokens: HashMap<String, String>,
    carts: HashMap<String, Vec<CartRecord>>,
    faults: HashMap<Route, Fault>,
    requests: Vec<RecordedRequest>,
}

#[derive(Debug, Clone, Default)]
struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fault(&self, route: Route) -> Option<Fault> {
        self.lock().faults.get(&route).cloned()
    }

    /// Username behind the bearer token, if it is one we issued.
    fn authorize(&self, headers: &HeaderMap) -> Result<String, Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        token
            .and_then(|token| self.lock().tokens.get(token).cloned())
            .ok_or_else(|| {
                error_response(
                    StatusCode::UNAUTHORIZED,
                    "Protected route, Oauth2 Bearer token not found",
                )
            })
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

/// The seeded catalog.
#[must_use]
pub fn catalog() -> Vec<Product> {
    let entry = |id: &str, name: &str, category: &str, cost: u32, rating: u8| Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        cost: Cost::from_units(cost),
        rating: Rating::new(rating),
        image_url: format!("https://crio-directus-assets.s3.ap-south-1.amazonaws.com/{id}.png"),
    };
    vec![
        entry("BW0jAAeDJmlZCF8i", "Tan Leatherette Weekender Duffle", "Fashion", 150, 4),
        entry("KCRwjF7lN97HnEaY", "UNIFACTOR Mens Running Shoes", "Fashion", 50, 5),
        entry("a4sLtEcMpzabRyfx", "YONEX Smash Badminton Racquet", "Sports", 100, 5),
        entry("upLK9JbQ4rMhTwt4", "Apple iPhone XR (64GB) - Black", "Phones", 700, 4),
        entry("v4sLtEcMpzabRyf2", "Stylecon 9 Seater RHS Sofa Set", "Home & Kitchen", 300, 3),
        entry("eD8jTqJLmYgfVV8i", "OnePlus Bullets Wireless Z in-Ear", "Electronics", 40, 4),
    ]
}

/// In-process mock backend on an ephemeral port.
///
/// Shuts down when dropped.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Start a mock with the seeded catalog and no users.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let state = MockState::default();
        state.lock().products = catalog();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(state.clone());

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock backend stopped");
            }
        });

        tracing::debug!(%addr, "Mock backend listening");
        Ok(Self { addr, state, task })
    }

    /// Base URL to point a client at.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// A real client configured for this mock.
    ///
    /// # Panics
    ///
    /// Panics if the client can't be built, which only happens when the
    /// TLS backend is broken.
    #[must_use]
    pub fn client(&self) -> BackendClient {
        let config = BackendConfig::new(&self.url()).expect("mock URL is valid");
        BackendClient::new(&config).expect("client builds")
    }

    /// Register a user directly.
    pub fn add_user(&self, username: &str, password: &str) {
        self.state
            .lock()
            .users
            .insert(username.to_string(), password.to_string());
    }

    /// Set a user's server-side cart.
    pub fn set_cart(&self, username: &str, records: Vec<CartRecord>) {
        self.state.lock().carts.insert(username.to_string(), records);
    }

    /// A user's server-side cart.
    #[must_use]
    pub fn cart(&self, username: &str) -> Vec<CartRecord> {
        self.state
            .lock()
            .carts
            .get(username)
            .cloned()
            .unwrap_or_default()
    }

    /// Inject a fault on a route, or clear it with `None`.
    pub fn fail(&self, route: Route, fault: Option<Fault>) {
        let mut inner = self.state.lock();
        match fault {
            Some(fault) => inner.faults.insert(route, fault),
            None => inner.faults.remove(&route),
        };
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests whose path starts with `prefix` (relative to `/api/v1`).
    #[must_use]
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        let prefix = format!("/api/v1/{prefix}");
        self.requests()
            .into_iter()
            .filter(|request| request.uri.starts_with(&prefix))
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn router(state: MockState) -> Router {
    let api = Router::new()
        .route("/products", get(products))
        .route("/products/search", get(search))
        .route("/cart", get(fetch_cart).post(update_cart))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register));

    Router::new()
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn record(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        uri: request
            .uri()
            .path_and_query()
            .map_or_else(|| request.uri().path().to_string(), ToString::to_string),
        request_id: request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };
    state.lock().requests.push(recorded);
    next.run(request).await
}

async fn products(State(state): State<MockState>) -> Response {
    if let Some(fault) = state.fault(Route::Products) {
        return fault.into_response();
    }
    Json(state.lock().products.clone()).into_response()
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    value: String,
}

async fn search(State(state): State<MockState>, Query(query): Query<SearchQuery>) -> Response {
    if let Some(fault) = state.fault(Route::Search) {
        return fault.into_response();
    }

    let needle = query.value.to_lowercase();
    let found: Vec<Product> = state
        .lock()
        .products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    if found.is_empty() {
        StatusCode::NOT_FOUND.into_response()
    } else {
        Json(found).into_response()
    }
}

async fn fetch_cart(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Some(fault) = state.fault(Route::Cart) {
        return fault.into_response();
    }
    let username = match state.authorize(&headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let cart = state.lock().carts.get(&username).cloned().unwrap_or_default();
    Json(cart).into_response()
}

async fn update_cart(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(update): Json<CartRecord>,
) -> Response {
    if let Some(fault) = state.fault(Route::Cart) {
        return fault.into_response();
    }
    let username = match state.authorize(&headers) {
        Ok(username) => username,
        Err(response) => return response,
    };

    let mut inner = state.lock();
    if !inner.products.iter().any(|p| p.id == update.product_id) {
        return error_response(StatusCode::BAD_REQUEST, "Product doesn't exist");
    }

    let cart = inner.carts.entry(username).or_default();
    let existing = cart
        .iter()
        .position(|record| record.product_id == update.product_id);
    match existing {
        Some(position) if update.quantity == 0 => {
            cart.remove(position);
        }
        Some(position) => {
            if let Some(record) = cart.get_mut(position) {
                record.quantity = update.quantity;
            }
        }
        None if update.quantity == 0 => {}
        None => cart.push(update),
    }
    Json(cart.clone()).into_response()
}

async fn login(
    State(state): State<MockState>,
    Json(credentials): Json<LoginCredentials>,
) -> Response {
    if let Some(fault) = state.fault(Route::Login) {
        return fault.into_response();
    }

    let mut inner = state.lock();
    match inner.users.get(&credentials.username) {
        Some(password) if *password == credentials.password => {
            let token = format!("token-{}", hex(&credentials.username));
            inner
                .tokens
                .insert(token.clone(), credentials.username.clone());
            Json(json!({
                "success": true,
                "token": token,
                "username": credentials.username,
                "balance": STARTING_BALANCE,
            }))
            .into_response()
        }
        Some(_) => error_response(StatusCode::BAD_REQUEST, "Password is incorrect"),
        None => error_response(StatusCode::BAD_REQUEST, "Username does not exist"),
    }
}

async fn register(
    State(state): State<MockState>,
    Json(credentials): Json<LoginCredentials>,
) -> Response {
    if let Some(fault) = state.fault(Route::Register) {
        return fault.into_response();
    }

    let mut inner = state.lock();
    if inner.users.contains_key(&credentials.username) {
        return error_response(StatusCode::BAD_REQUEST, "Username is already taken");
    }
    inner
        .users
        .insert(credentials.username, credentials.password);
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

/// Opaque but deterministic token material.
fn hex(username: &str) -> String {
    username
        .bytes()
        .map(|b| format!("{b:02x}"))
        .collect()
}
