//! Cravii client library.
//!
//! Everything a Cravii front end needs below the UI: the backend API client,
//! on-device persistence, the cart, checkout orchestration, and the catalog,
//! account, profile, and referral services.
//!
//! # Modules
//!
//! - [`api`] - HTTP client for the PHP backend, with retry
//! - [`store`] - Key-value persistence for the session and cart
//! - [`cart`] - Cart manager
//! - [`checkout`] - Coupon validation and the payment flow
//! - [`catalog`] - Cached recipes and categories, search helpers
//! - [`auth`], [`profile`], [`referrals`] - Account services
//! - [`context`] - Shared handles wiring the above together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod context;
pub mod profile;
pub mod referrals;
pub mod store;

pub use api::{ApiClient, ApiError, RetryPolicy};
pub use config::ClientConfig;
pub use context::ClientContext;
