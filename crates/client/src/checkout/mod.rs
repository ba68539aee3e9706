//! Checkout: coupon validation, payment hand-off, and completion.
//!
//! A [`CheckoutSession`] walks one order through these states:
//!
//! ```text
//! Loading ──load──▶ Ready ──submit──▶ Submitting ──▶ AwaitingPayment ──success URL──▶ Success
//!    │                ▲  │                 │                 │
//!    │                │  └─mismatch──▶ RestaurantMismatch    └─cancel URL / page error──▶ Ready
//!    │                └──── payment failure ◀──┘
//!    └──no session / expired──▶ ReloginRequired
//! ```
//!
//! Totals are never stored; they are recomputed from the cart, the fee
//! schedule, and the coupon flag every time they are needed, and the payment
//! payload is built from the same computation.

mod orchestrator;

use cravii_core::OrderId;
use thiserror::Error;

pub use orchestrator::{CheckoutSession, DeliveryDetails};

use crate::api::ApiError;
use crate::store::StoreError;

/// Message shown when the backend refuses a coupon without saying why.
pub const COUPON_INVALID_MESSAGE: &str = "Invalid coupon";

/// Where a checkout session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Fetching the user and fee schedule.
    Loading,
    /// Totals are available; the customer can edit details, apply a coupon,
    /// or pay.
    Ready,
    /// The payment request is in flight.
    Submitting,
    /// The hosted payment page is open.
    AwaitingPayment {
        authorization_url: String,
        order_id: Option<OrderId>,
    },
    /// Paid. The cart has been cleared.
    Success { order_id: Option<OrderId> },
    /// The cart mixes restaurants and cannot be ordered as is.
    RestaurantMismatch,
    /// The session is gone; the customer must log in again.
    ReloginRequired,
    /// Loading failed.
    Error(String),
}

impl CheckoutState {
    /// Short name, used in error messages and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::AwaitingPayment { .. } => "awaiting_payment",
            Self::Success { .. } => "success",
            Self::RestaurantMismatch => "restaurant_mismatch",
            Self::ReloginRequired => "relogin_required",
            Self::Error(_) => "error",
        }
    }
}

/// Errors from checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please log in to continue.")]
    NotLoggedIn,

    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Fee data not available. Please try again later.")]
    FeeUnavailable,

    #[error("Fill all delivery fields.")]
    MissingDeliveryDetails,

    #[error("Items must be from one restaurant.")]
    RestaurantMismatch,

    #[error("Enter a coupon code and log in.")]
    CouponCodeRequired,

    #[error("{0}")]
    CouponRejected(String),

    #[error("Coupon validation failed")]
    CouponValidationFailed(#[source] ApiError),

    #[error("Payment error: {0}")]
    Payment(String),

    #[error("{message}")]
    LoadFailed {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
