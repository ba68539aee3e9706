//! Login, signup, profile, and referrals against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::StatusCode;
use cravii_client::auth::AuthError;
use cravii_client::profile::{ProfileError, ProfileFields};
use cravii_client::referrals::{CODE_PREFIX, ReferralError, UNKNOWN_USER};
use cravii_client::store::{KEY_CART, KEY_USER_ID, KeyValueStore, MemoryStore};
use cravii_core::UserId;
use cravii_integration_tests::fixtures::{self, cart_item};
use cravii_integration_tests::{FakeBackend, Reply, logged_in_store};
use secrecy::SecretString;
use serde_json::json;

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

// ============================================================================
// Login & Logout
// ============================================================================

#[tokio::test]
async fn test_login_stores_session() {
    let backend = FakeBackend::start().await;
    backend.reply(
        "login.php",
        Reply::json(json!({ "message": "Login successful", "user": { "id": 7 } })),
    );
    let store = Arc::new(MemoryStore::new());
    let ctx = backend.context(Arc::clone(&store));

    let session = ctx
        .auth()
        .login("  Ada@Cravii.NG ", &secret("secret1"))
        .await
        .unwrap();

    assert_eq!(session.user_id, UserId::new(7));
    assert_eq!(session.email.as_deref(), Some("ada@cravii.ng"));

    let restored = ctx.auth().restore().await.unwrap().unwrap();
    assert_eq!(restored.user_id, UserId::new(7));
    assert!(restored.login_time.is_some());

    let body = backend.received("login.php")[0].body.clone().unwrap();
    assert_eq!(body, json!({ "email": "ada@cravii.ng", "password": "secret1" }));
}

#[tokio::test]
async fn test_login_refused_with_server_reason() {
    let backend = FakeBackend::start().await;
    backend.reply(
        "login.php",
        Reply::status(
            StatusCode::UNAUTHORIZED,
            json!({ "error": "Invalid email or password" }),
        ),
    );
    let store = Arc::new(MemoryStore::new());
    let ctx = backend.context(Arc::clone(&store));

    let err = ctx
        .auth()
        .login("ada@cravii.ng", &secret("wrong-pass"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Rejected(ref m) if m == "Invalid email or password"));
    assert_eq!(store.get(KEY_USER_ID).await.unwrap(), None);
}

#[tokio::test]
async fn test_login_without_user_is_refused() {
    let backend = FakeBackend::start().await;
    backend.reply("login.php", Reply::json(json!({ "error": "" })));
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    let err = ctx
        .auth()
        .login("ada@cravii.ng", &secret("secret1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Rejected(ref m) if m == "Invalid credentials"));
}

#[tokio::test]
async fn test_invalid_email_is_not_sent() {
    let backend = FakeBackend::start().await;
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    let err = ctx
        .auth()
        .login("ada.cravii.ng", &secret("secret1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidEmail(_)));
    assert_eq!(backend.calls("login.php"), 0);
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let backend = FakeBackend::start().await;
    let store = logged_in_store(7, &[cart_item(1, "1000", 1, 3)]);
    let ctx = backend.context(Arc::clone(&store));

    ctx.auth().logout().await.unwrap();

    assert_eq!(ctx.auth().restore().await.unwrap(), None);
    assert!(store.get(KEY_CART).await.unwrap().is_some());
    assert_eq!(ctx.cart().await.unwrap().items().len(), 1);
}

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_signup_sends_confirmation() {
    let backend = FakeBackend::start().await;
    backend.reply(
        "signup.php",
        Reply::json(json!({ "message": "User registered successfully" })),
    );
    let store = Arc::new(MemoryStore::new());
    let ctx = backend.context(Arc::clone(&store));

    ctx.auth()
        .signup("ada@cravii.ng", &secret("secret1"), &secret("secret1"))
        .await
        .unwrap();

    let body = backend.received("signup.php")[0].body.clone().unwrap();
    assert_eq!(body["email"], "ada@cravii.ng");
    assert_eq!(body["confirmPassword"], "secret1");
    // Signing up does not log in
    assert_eq!(store.get(KEY_USER_ID).await.unwrap(), None);
}

#[tokio::test]
async fn test_signup_refused() {
    let backend = FakeBackend::start().await;
    backend.reply(
        "signup.php",
        Reply::json(json!({ "error": "Email already exists" })),
    );
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    let err = ctx
        .auth()
        .signup("ada@cravii.ng", &secret("secret1"), &secret("secret1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Rejected(ref m) if m == "Email already exists"));
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_update_sends_trimmed_fields() {
    let backend = FakeBackend::start().await;
    backend.reply("get_user.php", Reply::json(fixtures::user(7, "Yaba")));
    backend.reply(
        "update_profile.php",
        Reply::json(json!({ "success": true, "message": "Profile updated" })),
    );
    let ctx = backend.context(logged_in_store(7, &[]));

    let user = ctx.profile().load().await.unwrap();
    let mut fields = ProfileFields::from(&user);
    fields.location = "  Surulere ".to_string();

    let message = ctx.profile().update(fields).await.unwrap();
    assert_eq!(message, "Profile updated");

    let body = backend.received("update_profile.php")[0].body.clone().unwrap();
    assert_eq!(body["id"], "7");
    assert_eq!(body["name"], "Ada Obi");
    assert_eq!(body["location"], "Surulere");
    assert_eq!(body["referral_code"], "");
}

#[tokio::test]
async fn test_profile_update_refused() {
    let backend = FakeBackend::start().await;
    backend.reply("update_profile.php", Reply::json(json!({ "success": false })));
    let ctx = backend.context(logged_in_store(7, &[]));

    let err = ctx
        .profile()
        .update(ProfileFields::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProfileError::Rejected(_)));
}

#[tokio::test]
async fn test_profile_requires_login() {
    let backend = FakeBackend::start().await;
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    assert!(matches!(
        ctx.profile().load().await,
        Err(ProfileError::NotLoggedIn)
    ));
    assert_eq!(backend.calls("get_user.php"), 0);
}

// ============================================================================
// Referrals
// ============================================================================

#[tokio::test]
async fn test_missing_referral_code_is_generated_and_saved() {
    let backend = FakeBackend::start().await;
    backend.reply("get_user.php", Reply::json(fixtures::user(7, "Yaba")));
    backend.reply(
        "update_referral_code.php",
        Reply::json(json!({ "success": true })),
    );
    let ctx = backend.context(logged_in_store(7, &[]));

    let code = ctx.referrals().ensure_code().await.unwrap();

    assert!(code.starts_with(CODE_PREFIX));
    assert_eq!(code.len(), CODE_PREFIX.len() + 3);
    let body = backend.received("update_referral_code.php")[0].body.clone().unwrap();
    assert_eq!(body["referral_code"], code.as_str());
    assert_eq!(body["id"], "7");
}

#[tokio::test]
async fn test_existing_referral_code_is_kept() {
    let backend = FakeBackend::start().await;
    backend.reply(
        "get_user.php",
        Reply::json(fixtures::ok(json!({ "id": 7, "referral_code": "cravii123" }))),
    );
    let ctx = backend.context(logged_in_store(7, &[]));

    assert_eq!(ctx.referrals().ensure_code().await.unwrap(), "cravii123");
    assert_eq!(backend.calls("update_referral_code.php"), 0);
}

#[tokio::test]
async fn test_referral_names() {
    let backend = FakeBackend::start().await;
    backend.reply(
        "get_referrals.php",
        Reply::json(fixtures::ok(json!([{ "name": "Tolu" }, { "name": null }]))),
    );
    let ctx = backend.context(logged_in_store(7, &[]));

    let names = ctx.referrals().referrals().await.unwrap();

    assert_eq!(names, vec!["Tolu".to_string(), UNKNOWN_USER.to_string()]);
    let query = &backend.received("get_referrals.php")[0].query;
    assert_eq!(query.get("id").map(String::as_str), Some("7"));
}

#[tokio::test]
async fn test_referrals_require_login() {
    let backend = FakeBackend::start().await;
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    assert!(matches!(
        ctx.referrals().referrals().await,
        Err(ReferralError::NotLoggedIn)
    ));
}
