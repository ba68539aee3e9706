//! Status enums for checkout and payment.

use serde::{Deserialize, Serialize};

/// Status reported by `process_checkout.php`.
///
/// Anything other than `"success"` is treated as a failure; the accompanying
/// `error` field carries the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Success,
    #[default]
    #[serde(other)]
    Failed,
}

/// Where the hosted payment page has navigated to.
///
/// The payment gateway's only contract with the client is a `success` or
/// `cancel` marker somewhere in the redirect URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentRedirect {
    /// Payment completed.
    Success,
    /// Customer backed out of the payment page.
    Cancelled,
    /// Any intermediate page (3-D Secure, bank selection, ...).
    InProgress,
}

impl PaymentRedirect {
    /// Classify a navigated URL. A success marker wins over a cancel marker.
    #[must_use]
    pub fn classify(url: &str) -> Self {
        if url.contains("success") {
            Self::Success
        } else if url.contains("cancel") {
            Self::Cancelled
        } else {
            Self::InProgress
        }
    }
}

impl std::fmt::Display for PaymentRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::InProgress => write!(f, "in_progress"),
        }
    }
}
