//! End-to-end checkout against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::StatusCode;
use cravii_client::checkout::{CheckoutError, CheckoutState};
use cravii_client::store::{KEY_USER_ID, KeyValueStore, MemoryStore};
use cravii_core::{CartItem, OrderId, PaymentRedirect};
use cravii_integration_tests::fixtures::{self, cart_item};
use cravii_integration_tests::{FakeBackend, Reply, logged_in_store};
use serde_json::json;

const USER_ID: i64 = 7;

/// Two lines from restaurant 3: subtotal 3500.
fn one_restaurant_cart() -> Vec<CartItem> {
    vec![cart_item(1, "1000", 2, 3), cart_item(2, "1,500", 1, 3)]
}

async fn backend() -> FakeBackend {
    let backend = FakeBackend::start().await;
    backend.reply("get_user.php", Reply::json(fixtures::user(USER_ID, "Lekki Phase 1")));
    backend.reply("fetch_fee.php", Reply::json(fixtures::fee(100, 500)));
    backend.reply("success_email.php", Reply::json(json!({ "success": true })));
    backend
}

fn payment_session(order_id: i64) -> Reply {
    Reply::json(json!({
        "status": "success",
        "authorization_url": "https://checkout.paystack.test/abc123",
        "order_id": order_id
    }))
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_load_prefills_address_from_profile() {
    let backend = backend().await;
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();

    assert_eq!(checkout.state(), &CheckoutState::Ready);
    assert_eq!(checkout.items().len(), 2);
    assert_eq!(checkout.delivery().address, "Lekki Phase 1");

    let requests = backend.received("get_user.php");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.get("id").map(String::as_str), Some("7"));
}

#[tokio::test]
async fn test_load_without_session_makes_no_calls() {
    let backend = backend().await;
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    let mut checkout = ctx.checkout();
    let err = checkout.load().await.unwrap_err();

    assert!(matches!(err, CheckoutError::NotLoggedIn));
    assert_eq!(checkout.state(), &CheckoutState::ReloginRequired);
    assert_eq!(backend.calls("get_user.php"), 0);
    assert_eq!(backend.calls("fetch_fee.php"), 0);
}

#[tokio::test]
async fn test_load_retries_transient_fee_failures() {
    let backend = backend().await;
    backend.replies(
        "fetch_fee.php",
        vec![
            Reply::status(StatusCode::BAD_GATEWAY, json!({ "error": "upstream" })),
            Reply::html("<b>Fatal error</b>"),
            Reply::json(fixtures::fee(100, 500)),
        ],
    );
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();

    assert_eq!(backend.calls("fetch_fee.php"), 3);
    assert_eq!(backend.calls("get_user.php"), 1);
    assert!(checkout.fee().is_some());
}

#[tokio::test]
async fn test_load_gives_up_after_retries() {
    let backend = backend().await;
    backend.reply(
        "fetch_fee.php",
        Reply::status(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "db down" })),
    );
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    let err = checkout.load().await.unwrap_err();

    assert!(matches!(err, CheckoutError::LoadFailed { .. }));
    assert!(matches!(checkout.state(), CheckoutState::Error(_)));
    assert_eq!(backend.calls("fetch_fee.php"), 3);
}

#[tokio::test]
async fn test_load_with_unknown_user_requires_relogin() {
    let backend = backend().await;
    backend.reply(
        "get_user.php",
        Reply::json(json!({ "success": false, "message": "User not found" })),
    );
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    let err = checkout.load().await.unwrap_err();

    assert!(matches!(err, CheckoutError::SessionExpired));
    assert_eq!(checkout.state(), &CheckoutState::ReloginRequired);
    // Rejections are not retried
    assert_eq!(backend.calls("get_user.php"), 1);
}

#[tokio::test]
async fn test_load_with_expired_session_requires_relogin_and_keeps_cart() {
    let backend = backend().await;
    backend.reply(
        "get_user.php",
        Reply::status(StatusCode::UNAUTHORIZED, json!({ "error": "User not logged in" })),
    );
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    let err = checkout.load().await.unwrap_err();

    assert!(matches!(err, CheckoutError::SessionExpired));
    assert_eq!(checkout.state(), &CheckoutState::ReloginRequired);
    assert_eq!(backend.calls("get_user.php"), 1);
    assert_eq!(ctx.cart().await.unwrap().items().len(), 2);
}

#[tokio::test]
async fn test_load_with_not_logged_in_status_is_not_retried() {
    let backend = backend().await;
    backend.reply(
        "get_user.php",
        Reply::status(StatusCode::FORBIDDEN, json!({ "error": "User not logged in" })),
    );
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    let err = checkout.load().await.unwrap_err();

    assert!(matches!(err, CheckoutError::SessionExpired));
    assert_eq!(checkout.state(), &CheckoutState::ReloginRequired);
    assert_eq!(backend.calls("get_user.php"), 1);
}

// ============================================================================
// Coupons
// ============================================================================

#[tokio::test]
async fn test_coupon_discounts_vat() {
    let backend = backend().await;
    backend.reply(
        "validate_coupon.php",
        Reply::json(json!({ "success": true, "message": "Coupon applied" })),
    );
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();
    let before = checkout.totals().unwrap();
    checkout.apply_coupon("  SAVE20 ").await.unwrap();
    let after = checkout.totals().unwrap();

    assert!(checkout.coupon_valid());
    assert_eq!(before.vat.to_fixed(), "200.00");
    assert_eq!(after.vat.to_fixed(), "160.00");

    let body = backend.received("validate_coupon.php")[0].body.clone().unwrap();
    assert_eq!(body["coupon_code"], "SAVE20");
    assert_eq!(body["user_id"], "7");
}

#[tokio::test]
async fn test_rejected_coupon_keeps_full_vat() {
    let backend = backend().await;
    backend.reply(
        "validate_coupon.php",
        Reply::json(json!({ "success": false, "message": "Coupon expired" })),
    );
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();
    let err = checkout.apply_coupon("OLD10").await.unwrap_err();

    assert!(matches!(err, CheckoutError::CouponRejected(ref m) if m == "Coupon expired"));
    assert!(!checkout.coupon_valid());
    assert_eq!(checkout.totals().unwrap().vat.to_fixed(), "200.00");
}

#[tokio::test]
async fn test_blank_coupon_is_not_sent() {
    let backend = backend().await;
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();

    assert!(matches!(
        checkout.apply_coupon("   ").await,
        Err(CheckoutError::CouponCodeRequired)
    ));
    assert_eq!(backend.calls("validate_coupon.php"), 0);
}

// ============================================================================
// Payment
// ============================================================================

#[tokio::test]
async fn test_successful_payment_clears_cart_and_sends_email() {
    let backend = backend().await;
    backend.reply(
        "validate_coupon.php",
        Reply::json(json!({ "success": true })),
    );
    backend.reply("process_checkout.php", payment_session(77));
    let store = logged_in_store(USER_ID, &one_restaurant_cart());
    let ctx = backend.context(Arc::clone(&store));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();
    {
        let delivery = checkout.delivery_mut();
        delivery.phone_number = "08030000000".to_string();
        delivery.location = "Lekki".to_string();
    }
    checkout.apply_coupon("SAVE20").await.unwrap();

    let url = checkout.submit().await.unwrap();
    assert_eq!(url, "https://checkout.paystack.test/abc123");
    assert!(matches!(
        checkout.state(),
        CheckoutState::AwaitingPayment { .. }
    ));

    // 3500 + 160 VAT + 152.50 processor fee + 500 delivery
    let body = backend.received("process_checkout.php")[0].body.clone().unwrap();
    assert_eq!(body["total"], "4312.50");
    assert_eq!(body["vat_fee"], "160.00");
    assert_eq!(body["paystack_fee"], "152.50");
    assert_eq!(body["delivery_fee"], "500.00");
    assert_eq!(body["restaurant_id"], "3");
    assert_eq!(body["deliveryAddress"], "Lekki Phase 1");
    assert_eq!(body["phoneNumber"], "08030000000");
    assert_eq!(body["userLocation"], "Lekki");
    assert_eq!(body["cartItems"].as_array().unwrap().len(), 2);

    // Intermediate pages change nothing
    assert_eq!(
        checkout
            .on_navigation("https://checkout.paystack.test/abc123/3ds")
            .await
            .unwrap(),
        PaymentRedirect::InProgress
    );
    assert_eq!(
        checkout
            .on_navigation("https://cravii.ng/payment/success?reference=abc123")
            .await
            .unwrap(),
        PaymentRedirect::Success
    );
    checkout.take_email_task().unwrap().await.unwrap();

    assert_eq!(
        checkout.state(),
        &CheckoutState::Success {
            order_id: Some(OrderId::new(77))
        }
    );
    assert!(!checkout.coupon_valid());
    assert!(ctx.cart().await.unwrap().is_empty());

    let email = backend.received("success_email.php");
    assert_eq!(email.len(), 1);
    assert_eq!(email[0].body.as_ref().unwrap()["order_id"], "77");
}

#[tokio::test]
async fn test_cancelled_payment_keeps_cart() {
    let backend = backend().await;
    backend.reply("process_checkout.php", payment_session(78));
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();
    checkout.delivery_mut().phone_number = "08030000000".to_string();
    checkout.delivery_mut().location = "Lekki".to_string();
    checkout.submit().await.unwrap();

    let redirect = checkout
        .on_navigation("https://cravii.ng/payment/cancel")
        .await
        .unwrap();

    assert_eq!(redirect, PaymentRedirect::Cancelled);
    assert_eq!(checkout.state(), &CheckoutState::Ready);
    assert!(checkout.take_email_task().is_none());
    assert_eq!(ctx.cart().await.unwrap().items().len(), 2);
    assert_eq!(backend.calls("success_email.php"), 0);
}

#[tokio::test]
async fn test_mixed_restaurants_are_refused_locally() {
    let backend = backend().await;
    let cart = vec![cart_item(1, "1000", 1, 3), cart_item(9, "2000", 1, 4)];
    let ctx = backend.context(logged_in_store(USER_ID, &cart));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();
    checkout.delivery_mut().phone_number = "08030000000".to_string();
    checkout.delivery_mut().location = "Lekki".to_string();

    assert!(matches!(
        checkout.submit().await,
        Err(CheckoutError::RestaurantMismatch)
    ));
    assert_eq!(checkout.state(), &CheckoutState::RestaurantMismatch);
    assert_eq!(backend.calls("process_checkout.php"), 0);

    checkout.dismiss_mismatch().unwrap();
    assert_eq!(checkout.state(), &CheckoutState::Ready);
}

#[tokio::test]
async fn test_missing_delivery_details_are_refused_locally() {
    let backend = backend().await;
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();

    assert!(matches!(
        checkout.submit().await,
        Err(CheckoutError::MissingDeliveryDetails)
    ));
    assert_eq!(checkout.state(), &CheckoutState::Ready);
    assert_eq!(backend.calls("process_checkout.php"), 0);
}

#[tokio::test]
async fn test_logged_out_backend_forces_relogin_and_keeps_cart() {
    let backend = backend().await;
    backend.reply(
        "process_checkout.php",
        Reply::status(StatusCode::UNAUTHORIZED, json!({ "error": "User not logged in" })),
    );
    let store = logged_in_store(USER_ID, &one_restaurant_cart());
    let ctx = backend.context(Arc::clone(&store));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();
    checkout.delivery_mut().phone_number = "08030000000".to_string();
    checkout.delivery_mut().location = "Lekki".to_string();

    assert!(matches!(
        checkout.submit().await,
        Err(CheckoutError::SessionExpired)
    ));
    assert_eq!(checkout.state(), &CheckoutState::ReloginRequired);
    // Payment requests are never retried
    assert_eq!(backend.calls("process_checkout.php"), 1);

    checkout.acknowledge_relogin().await.unwrap();
    assert_eq!(store.get(KEY_USER_ID).await.unwrap(), None);
    assert_eq!(ctx.cart().await.unwrap().items().len(), 2);
}

#[tokio::test]
async fn test_not_logged_in_error_in_body_forces_relogin() {
    let backend = backend().await;
    backend.reply(
        "process_checkout.php",
        Reply::json(json!({ "status": "error", "error": "User not logged in" })),
    );
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();
    checkout.delivery_mut().phone_number = "08030000000".to_string();
    checkout.delivery_mut().location = "Lekki".to_string();

    assert!(matches!(
        checkout.submit().await,
        Err(CheckoutError::SessionExpired)
    ));
    assert_eq!(checkout.state(), &CheckoutState::ReloginRequired);
}

#[tokio::test]
async fn test_declined_payment_returns_to_ready() {
    let backend = backend().await;
    backend.reply(
        "process_checkout.php",
        Reply::json(json!({ "status": "failed", "error": "Card declined" })),
    );
    let ctx = backend.context(logged_in_store(USER_ID, &one_restaurant_cart()));

    let mut checkout = ctx.checkout();
    checkout.load().await.unwrap();
    checkout.delivery_mut().phone_number = "08030000000".to_string();
    checkout.delivery_mut().location = "Lekki".to_string();

    let err = checkout.submit().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Payment(ref m) if m == "Card declined"));
    assert_eq!(checkout.state(), &CheckoutState::Ready);
    assert_eq!(ctx.cart().await.unwrap().items().len(), 2);
}
