//! Request and response bodies for the backend API.

use qkart_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUpdate {
    /// Product to update.
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// New absolute quantity.
    #[serde(rename = "qty")]
    pub quantity: u32,
}

/// Successful `POST /auth/login` response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Always `true` on success.
    pub success: bool,
    /// Bearer token for authenticated calls.
    pub token: String,
    /// Username the backend logged in.
    pub username: String,
    /// Wallet balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("success", &self.success)
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}

/// Failure body the backend sends with 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`.
    #[serde(default)]
    pub success: bool,
    /// Human-readable reason.
    pub message: Option<String>,
}
