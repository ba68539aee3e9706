//! Request and response shapes of the Cravii backend.

use cravii_core::{CartItem, OrderId, PaymentStatus, UserId};
use serde::{Deserialize, Deserializer, Serialize};

use super::ApiError;

// =============================================================================
// Envelopes
// =============================================================================

/// The `{success, data, message}` wrapper most scripts answer with.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into [`ApiError::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns `Rejected` when the backend reports failure, or
    /// `EmptyResponse` when it reports success without a payload.
    pub fn into_data(self, fallback: &str) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected {
                message: self.message.unwrap_or_else(|| fallback.to_string()),
            });
        }
        self.data.ok_or(ApiError::EmptyResponse)
    }

    /// Like [`Self::into_data`], but a successful envelope without `data`
    /// yields the default value (the backend omits empty lists).
    ///
    /// # Errors
    ///
    /// Returns `Rejected` when the backend reports failure.
    pub fn into_data_or_default(self, fallback: &str) -> Result<T, ApiError>
    where
        T: Default,
    {
        if !self.success {
            return Err(ApiError::Rejected {
                message: self.message.unwrap_or_else(|| fallback.to_string()),
            });
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// `{success, message}` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error bodies carry the reason in either `error` or `message`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error
            .filter(|s| !s.is_empty())
            .or(self.message.filter(|s| !s.is_empty()))
    }
}

// =============================================================================
// Users
// =============================================================================

/// A customer profile as served by `get_user.php`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub gender: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub referral_code: String,
}

/// Body of `update_profile.php`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub id: UserId,
    pub name: String,
    pub location: String,
    pub gender: String,
    pub referral_code: String,
}

/// Body of `update_referral_code.php`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReferralCodeUpdate<'a> {
    pub id: UserId,
    pub referral_code: &'a str,
}

/// A user who signed up with someone's referral code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Referral {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

/// Body of `login.php`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Answer of `login.php`. A logged-in answer carries `user.id`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub user: Option<LoginUser>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub id: UserId,
}

/// Body of `signup.php`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Answer of `signup.php`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Checkout
// =============================================================================

/// Body of `validate_coupon.php`.
#[derive(Debug, Serialize)]
pub(crate) struct CouponRequest<'a> {
    pub user_id: UserId,
    pub coupon_code: &'a str,
}

/// Body of `process_checkout.php`.
///
/// Amounts are fixed-point strings taken from the same totals the customer
/// was shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutPayload {
    #[serde(rename = "deliveryAddress")]
    pub delivery_address: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(rename = "userLocation")]
    pub user_location: String,
    #[serde(rename = "cartItems")]
    pub cart_items: Vec<CartItem>,
    pub total: String,
    pub restaurant_id: String,
    pub vat_fee: String,
    pub delivery_fee: String,
    pub paystack_fee: String,
}

/// Answer of `process_checkout.php`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub authorization_url: Option<String>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `success_email.php`.
#[derive(Debug, Serialize)]
pub(crate) struct SuccessEmailRequest {
    pub order_id: OrderId,
}

// =============================================================================
// Helpers
// =============================================================================

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
