//! Fee, coupon, payment, and confirmation endpoints.

use cravii_core::{FeeSchedule, OrderId, UserId};
use tracing::instrument;

use super::types::{
    CheckoutPayload, CheckoutResponse, CouponRequest, Envelope, MessageResponse,
    SuccessEmailRequest,
};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Current VAT and delivery fees. Never cached.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails or the backend reports failure.
    #[instrument(skip(self))]
    pub async fn fetch_fee(&self) -> Result<FeeSchedule, ApiError> {
        let envelope: Envelope<FeeSchedule> = self.get("fetch_fee.php", &[]).await?;
        envelope.into_data("Failed to fetch fees. Please try again later.")
    }

    /// Ask the backend whether `code` is a valid coupon for `user_id`.
    ///
    /// A refused coupon is `Ok` with `success: false`; only transport and
    /// format failures are errors.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport/format failures.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn validate_coupon(
        &self,
        user_id: UserId,
        coupon_code: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.post(
            "validate_coupon.php",
            &CouponRequest {
                user_id,
                coupon_code,
            },
        )
        .await
    }

    /// Create an order and a hosted payment session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport/format failures; a 401 is `Unauthorized`.
    #[instrument(skip(self, payload), fields(total = %payload.total, restaurant_id = %payload.restaurant_id))]
    pub async fn process_checkout(
        &self,
        payload: &CheckoutPayload,
    ) -> Result<CheckoutResponse, ApiError> {
        self.post("process_checkout.php", payload).await
    }

    /// Ask the backend to email the order confirmation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport/format failures.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn send_success_email(&self, order_id: OrderId) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .post("success_email.php", &SuccessEmailRequest { order_id })
            .await?;
        Ok(())
    }
}
