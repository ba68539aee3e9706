use cravii_core::cart::distinct_restaurants;
use cravii_core::{
    CartItem, FeeSchedule, OrderId, PaymentRedirect, PaymentStatus, Totals, UserId,
    recompute_totals,
};
use tokio::task::JoinHandle;
use tracing::instrument;

use super::{COUPON_INVALID_MESSAGE, CheckoutError, CheckoutState};
use crate::api::{
    ApiClient, ApiError, CheckoutPayload, RetryPolicy, User, mentions_not_logged_in, retry,
};
use crate::store::{CartRepository, SessionRepository};

/// Delivery fields the customer fills in before paying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryDetails {
    pub address: String,
    pub phone_number: String,
    pub location: String,
}

impl DeliveryDetails {
    fn is_complete(&self) -> bool {
        [&self.address, &self.phone_number, &self.location]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// One pass through checkout, from loading fees to a paid order.
///
/// Operations that are not valid in the current state fail with
/// [`CheckoutError::InvalidState`] and change nothing.
pub struct CheckoutSession {
    api: ApiClient,
    sessions: SessionRepository,
    carts: CartRepository,
    retry: RetryPolicy,

    state: CheckoutState,
    user: Option<User>,
    fee: Option<FeeSchedule>,
    items: Vec<CartItem>,
    coupon_code: String,
    coupon_valid: bool,
    delivery: DeliveryDetails,
    email_task: Option<JoinHandle<()>>,
}

impl CheckoutSession {
    pub fn new(
        api: ApiClient,
        sessions: SessionRepository,
        carts: CartRepository,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            api,
            sessions,
            carts,
            retry,
            state: CheckoutState::Loading,
            user: None,
            fee: None,
            items: Vec::new(),
            coupon_code: String::new(),
            coupon_valid: false,
            delivery: DeliveryDetails::default(),
            email_task: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Id of the loaded user, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().and_then(|u| u.id)
    }

    #[must_use]
    pub const fn fee(&self) -> Option<&FeeSchedule> {
        self.fee.as_ref()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn coupon_code(&self) -> &str {
        &self.coupon_code
    }

    #[must_use]
    pub const fn coupon_valid(&self) -> bool {
        self.coupon_valid
    }

    #[must_use]
    pub const fn delivery(&self) -> &DeliveryDetails {
        &self.delivery
    }

    pub const fn delivery_mut(&mut self) -> &mut DeliveryDetails {
        &mut self.delivery
    }

    /// Current totals, or `None` until the fee schedule has loaded.
    #[must_use]
    pub fn totals(&self) -> Option<Totals> {
        self.fee
            .as_ref()
            .map(|fee| recompute_totals(&self.items, fee, self.coupon_valid))
    }

    /// The confirmation email task spawned on success, if any.
    ///
    /// Short-lived callers should await it before exiting so the request is
    /// not dropped with the runtime.
    pub const fn take_email_task(&mut self) -> Option<JoinHandle<()>> {
        self.email_task.take()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Fetch the user and fee schedule and read the cart.
    ///
    /// # Errors
    ///
    /// - `NotLoggedIn` when no user id is stored (no network call is made)
    /// - `SessionExpired` when the backend no longer accepts the user
    /// - `LoadFailed` when the user or fees cannot be fetched after retries
    /// - `Store` when the stored cart cannot be read
    #[instrument(skip(self), fields(state = self.state.name()))]
    pub async fn load(&mut self) -> Result<(), CheckoutError> {
        if matches!(
            self.state,
            CheckoutState::Submitting | CheckoutState::AwaitingPayment { .. }
        ) {
            return Err(self.invalid("load"));
        }
        self.state = CheckoutState::Loading;

        let Some(user_id) = self.sessions.current_user_id().await? else {
            tracing::info!("No stored session, login required");
            self.state = CheckoutState::ReloginRequired;
            return Err(CheckoutError::NotLoggedIn);
        };

        let api = &self.api;
        let (user, fee) = tokio::join!(
            retry(self.retry, "get_user", || api.get_user(user_id)),
            retry(self.retry, "fetch_fee", || api.fetch_fee()),
        );

        let user = match user {
            Ok(user) => user,
            Err(e) if e.is_session_error() || matches!(e, ApiError::Rejected { .. }) => {
                tracing::warn!(user_id = %user_id, error = %e, "Session no longer valid");
                self.state = CheckoutState::ReloginRequired;
                return Err(CheckoutError::SessionExpired);
            }
            Err(e) => {
                return Err(self.fail_load(
                    "Failed to load data. Please check your network or try again later.",
                    e,
                ));
            }
        };

        let fee = match fee {
            Ok(fee) => fee,
            Err(e) => {
                return Err(self.fail_load("Failed to fetch fees. Please try again later.", e));
            }
        };

        let items = match self.carts.load().await {
            Ok(items) => items,
            Err(e) => {
                self.state = CheckoutState::Error(e.to_string());
                return Err(e.into());
            }
        };

        if self.delivery.address.trim().is_empty() {
            self.delivery.address.clone_from(&user.location);
        }
        self.user = Some(user);
        self.fee = Some(fee);
        self.items = items;
        self.state = CheckoutState::Ready;

        tracing::info!(
            user_id = %user_id,
            line_items = self.items.len(),
            "Checkout ready"
        );
        Ok(())
    }

    /// Validate a coupon code with the backend.
    ///
    /// # Errors
    ///
    /// - `CouponCodeRequired` / `NotLoggedIn` locally, without a network call
    /// - `CouponRejected` with the server's reason; the coupon flag is reset
    /// - `CouponValidationFailed` when the backend cannot be reached; the
    ///   coupon flag is left as it was
    #[instrument(skip(self))]
    pub async fn apply_coupon(&mut self, code: &str) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::Ready {
            return Err(self.invalid("apply a coupon"));
        }

        let code = code.trim();
        let user_id = self.sessions.current_user_id().await?;
        let Some(user_id) = user_id.filter(|_| !code.is_empty()) else {
            return Err(if code.is_empty() {
                CheckoutError::CouponCodeRequired
            } else {
                CheckoutError::NotLoggedIn
            });
        };
        code.clone_into(&mut self.coupon_code);

        match self.api.validate_coupon(user_id, code).await {
            Ok(response) if response.success => {
                tracing::info!(user_id = %user_id, "Coupon applied");
                self.coupon_valid = true;
                Ok(())
            }
            Ok(response) => {
                self.coupon_valid = false;
                let reason = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| COUPON_INVALID_MESSAGE.to_string());
                tracing::info!(user_id = %user_id, reason = %reason, "Coupon rejected");
                Err(CheckoutError::CouponRejected(reason))
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Coupon validation failed");
                Err(CheckoutError::CouponValidationFailed(e))
            }
        }
    }

    /// Create the order and open a payment session.
    ///
    /// Returns the hosted payment page URL. The request is sent once; a
    /// failed attempt returns to `Ready` with everything the customer entered
    /// intact.
    ///
    /// # Errors
    ///
    /// - `EmptyCart`, `FeeUnavailable`, `MissingDeliveryDetails` locally
    /// - `RestaurantMismatch` locally; the session moves to that state
    /// - `SessionExpired` when the backend reports the user is logged out
    /// - `Payment` for any other failure
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<String, CheckoutError> {
        if self.state != CheckoutState::Ready {
            return Err(self.invalid("submit payment"));
        }
        if self.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let Some(totals) = self.totals() else {
            return Err(CheckoutError::FeeUnavailable);
        };
        if !self.delivery.is_complete() {
            return Err(CheckoutError::MissingDeliveryDetails);
        }

        let restaurants = distinct_restaurants(&self.items);
        let Some(restaurant_id) = restaurants.first().copied().filter(|_| restaurants.len() == 1)
        else {
            tracing::warn!(restaurants = ?restaurants, "Cart spans several restaurants");
            self.state = CheckoutState::RestaurantMismatch;
            return Err(CheckoutError::RestaurantMismatch);
        };

        let payload = CheckoutPayload {
            delivery_address: self.delivery.address.trim().to_string(),
            phone_number: self.delivery.phone_number.trim().to_string(),
            user_location: self.delivery.location.trim().to_string(),
            cart_items: self.items.clone(),
            total: totals.total_fixed(),
            restaurant_id: restaurant_id.to_string(),
            vat_fee: totals.vat.to_fixed(),
            delivery_fee: totals.delivery.to_fixed(),
            paystack_fee: totals.processor_fee.to_fixed(),
        };

        self.state = CheckoutState::Submitting;
        let result = self.api.process_checkout(&payload).await;

        match result {
            Ok(response) => match (response.status, response.authorization_url) {
                (PaymentStatus::Success, Some(url)) if !url.is_empty() => {
                    tracing::info!(
                        order_id = ?response.order_id,
                        total = %payload.total,
                        "Payment session created"
                    );
                    self.state = CheckoutState::AwaitingPayment {
                        authorization_url: url.clone(),
                        order_id: response.order_id,
                    };
                    Ok(url)
                }
                _ => {
                    let reason = response.error.unwrap_or_default();
                    if mentions_not_logged_in(&reason) {
                        return Err(self.expire_session());
                    }
                    Err(self.fail_payment(if reason.is_empty() {
                        "Try again.".to_string()
                    } else {
                        reason
                    }))
                }
            },
            Err(e) if e.is_session_error() => Err(self.expire_session()),
            Err(e) => {
                let reason = e
                    .server_message()
                    .map_or_else(|| e.to_string(), str::to_string);
                Err(self.fail_payment(reason))
            }
        }
    }

    /// Report where the hosted payment page has navigated.
    ///
    /// A success URL clears the stored cart, fires the confirmation email,
    /// and completes the session. A cancel URL returns to `Ready` with the
    /// cart untouched. Other URLs change nothing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless a payment page is open.
    #[instrument(skip(self))]
    pub async fn on_navigation(&mut self, url: &str) -> Result<PaymentRedirect, CheckoutError> {
        let CheckoutState::AwaitingPayment { order_id, .. } = self.state else {
            return Err(self.invalid("handle payment navigation"));
        };

        let redirect = PaymentRedirect::classify(url);
        match redirect {
            PaymentRedirect::Success => {
                // Paid either way; a stale stored cart is only logged
                if let Err(e) = self.carts.clear().await {
                    tracing::error!(error = %e, "Failed to clear cart after payment");
                }
                self.items.clear();
                self.coupon_valid = false;
                self.coupon_code.clear();

                if let Some(order_id) = order_id {
                    self.email_task = Some(self.spawn_success_email(order_id));
                }

                tracing::info!(order_id = ?order_id, "Payment completed");
                self.state = CheckoutState::Success { order_id };
            }
            PaymentRedirect::Cancelled => {
                tracing::info!(order_id = ?order_id, "Payment cancelled");
                self.state = CheckoutState::Ready;
            }
            PaymentRedirect::InProgress => {}
        }
        Ok(redirect)
    }

    /// The payment page failed to load.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless a payment page is open.
    pub fn on_page_error(&mut self, description: &str) -> Result<(), CheckoutError> {
        if !matches!(self.state, CheckoutState::AwaitingPayment { .. }) {
            return Err(self.invalid("handle a payment page error"));
        }
        tracing::error!(error = description, "Failed to load payment page");
        self.state = CheckoutState::Ready;
        Ok(())
    }

    /// The customer closed the payment page.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless a payment page is open.
    pub fn close_payment(&mut self) -> Result<(), CheckoutError> {
        if !matches!(self.state, CheckoutState::AwaitingPayment { .. }) {
            return Err(self.invalid("close the payment page"));
        }
        self.state = CheckoutState::Ready;
        Ok(())
    }

    /// Leave the mismatch state after the customer has been told to fix the
    /// cart. Call [`Self::load`] again once the cart has changed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session is in `RestaurantMismatch`.
    pub fn dismiss_mismatch(&mut self) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::RestaurantMismatch {
            return Err(self.invalid("dismiss a restaurant mismatch"));
        }
        self.state = CheckoutState::Ready;
        Ok(())
    }

    /// The customer accepted the relogin prompt: forget the stored user id.
    /// The cart is kept for after login.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless relogin is required, or `Store` if the
    /// id cannot be removed.
    pub async fn acknowledge_relogin(&mut self) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::ReloginRequired {
            return Err(self.invalid("acknowledge relogin"));
        }
        self.sessions.clear_user_id().await?;
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidState {
            action,
            state: self.state.name(),
        }
    }

    fn fail_load(&mut self, message: &str, source: ApiError) -> CheckoutError {
        tracing::error!(error = %source, "{message}");
        self.state = CheckoutState::Error(message.to_string());
        CheckoutError::LoadFailed {
            message: message.to_string(),
            source,
        }
    }

    fn fail_payment(&mut self, reason: String) -> CheckoutError {
        tracing::error!(reason = %reason, "Payment request failed");
        self.state = CheckoutState::Ready;
        CheckoutError::Payment(reason)
    }

    fn expire_session(&mut self) -> CheckoutError {
        tracing::warn!("Backend reports the session has expired");
        self.state = CheckoutState::ReloginRequired;
        CheckoutError::SessionExpired
    }

    fn spawn_success_email(&self, order_id: OrderId) -> JoinHandle<()> {
        let api = self.api.clone();
        tokio::spawn(async move {
            if let Err(e) = api.send_success_email(order_id).await {
                tracing::warn!(order_id = %order_id, error = %e, "Confirmation email failed");
            }
        })
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: CheckoutState) {
        self.state = state;
    }
}

impl std::fmt::Debug for CheckoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("state", &self.state)
            .field("items", &self.items.len())
            .field("coupon_valid", &self.coupon_valid)
            .finish_non_exhaustive()
    }
}
