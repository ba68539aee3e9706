//! Cravii backend API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS to a fixed set of PHP scripts under one base URL
//! - One shared `reqwest::Client` with a cookie store; the backend ties
//!   checkout to the PHP session cookie set at login
//! - Every response must be `application/json`; anything else is an error
//!   for that call, never silently defaulted
//! - Checkout-critical reads go through [`retry`] with exponential backoff
//!
//! # Endpoints
//!
//! | Script | Method | Used by |
//! |--------|--------|---------|
//! | `get_user.php?id=` | GET | checkout, profile, referrals |
//! | `get_recipes.php`, `get_recipe.php?id=` | GET | catalog |
//! | `get_categories.php`, `fetch_recipes_by_category.php?category_id=` | GET | catalog |
//! | `get_restaurant.php?id=` | GET | catalog |
//! | `fetch_fee.php` | GET | checkout |
//! | `validate_coupon.php` | POST | checkout |
//! | `process_checkout.php` | POST | checkout |
//! | `success_email.php` | POST | checkout (fire-and-forget) |
//! | `login.php`, `signup.php` | POST | auth |
//! | `update_profile.php`, `update_referral_code.php`, `get_referrals.php?id=` | POST/GET | profile, referrals |

mod catalog;
mod checkout;
mod client;
mod retry;
pub mod types;
mod users;

pub use client::ApiClient;
pub use retry::{RetryPolicy, retry};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the Cravii backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend answered 401; the session is gone.
    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("not logged in"))]
    Unauthorized(Option<String>),

    /// Non-success HTTP status other than 401.
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no details"))]
    Status {
        status: u16,
        /// `error` or `message` field of a JSON error body, if any.
        message: Option<String>,
    },

    /// Response was not declared as JSON.
    #[error("Invalid content type: {}", .0.as_deref().unwrap_or("none"))]
    InvalidContentType(Option<String>),

    /// Response body was empty.
    #[error("Empty response")]
    EmptyResponse,

    /// Response body was not valid JSON for the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered `success: false`.
    #[error("Rejected: {message}")]
    Rejected { message: String },
}

impl ApiError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Session and business-rule failures are final; transport, server, and
    /// malformed-response failures are all retried the same way.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        if self.is_session_error() {
            return false;
        }
        match self {
            Self::Http(_)
            | Self::Status { .. }
            | Self::InvalidContentType(_)
            | Self::EmptyResponse
            | Self::Parse(_) => true,
            Self::Url(_) | Self::Unauthorized(_) | Self::Rejected { .. } => false,
        }
    }

    /// Whether the error means the user must log in again.
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        match self {
            Self::Unauthorized(_) => true,
            Self::Status {
                message: Some(message),
                ..
            }
            | Self::Rejected { message } => mentions_not_logged_in(message),
            _ => false,
        }
    }

    /// Human-readable reason supplied by the server, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(message) | Self::Status { message, .. } => message.as_deref(),
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}

/// The backend signals an expired PHP session with this phrase in free text.
pub(crate) fn mentions_not_logged_in(text: &str) -> bool {
    text.to_lowercase().contains("not logged in")
}
