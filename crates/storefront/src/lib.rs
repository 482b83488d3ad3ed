//! QKart storefront client library.
//!
//! Talks to the QKart REST backend and holds the client-side view state:
//! the cart view, the debounced product search, login sessions and
//! notifications. Front ends (the `qkart` CLI, tests) drive it through
//! these modules.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod backend;
pub mod cart_view;
pub mod config;
pub mod error;
pub mod notify;
pub mod search;
pub mod session;

#[cfg(test)]
mod testing;
