//! Browsing and cart persistence against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::path::PathBuf;
use std::sync::Arc;

use cravii_client::cart::{AddOutcome, CartError};
use cravii_client::catalog::UNKNOWN_RESTAURANT;
use cravii_client::store::MemoryStore;
use cravii_client::{ApiError, ClientConfig, ClientContext};
use cravii_core::{CartItem, CategoryId, RecipeId, RestaurantId};
use cravii_integration_tests::fixtures::{self, cart_item};
use cravii_integration_tests::{FakeBackend, Reply};
use serde_json::json;

fn menu() -> serde_json::Value {
    fixtures::ok(json!([
        fixtures::recipe(1, "Jollof Rice", "2500", 3),
        fixtures::recipe(2, "Suya", "1,200.50", 3),
        fixtures::recipe(3, "Moi Moi", "800", 4),
    ]))
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_recipes_are_cached() {
    let backend = FakeBackend::start().await;
    backend.reply("get_recipes.php", Reply::json(menu()));
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    let first = ctx.catalog().recipes().await;
    let second = ctx.catalog().recipes().await;

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert_eq!(backend.calls("get_recipes.php"), 1);

    ctx.catalog().invalidate_all().await;
    ctx.catalog().recipes().await;
    assert_eq!(backend.calls("get_recipes.php"), 2);
}

#[tokio::test]
async fn test_failed_list_is_empty_and_not_cached() {
    let backend = FakeBackend::start().await;
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    assert!(ctx.catalog().categories().await.is_empty());

    backend.reply(
        "get_categories.php",
        Reply::json(fixtures::ok(json!([{ "id": 1, "name": "Rice" }]))),
    );
    assert_eq!(ctx.catalog().categories().await.len(), 1);
    assert_eq!(backend.calls("get_categories.php"), 2);
}

#[tokio::test]
async fn test_recipes_in_category_sends_category_id() {
    let backend = FakeBackend::start().await;
    backend.reply("fetch_recipes_by_category.php", Reply::json(menu()));
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    let recipes = ctx.catalog().recipes_in_category(CategoryId::new(5)).await;

    assert_eq!(recipes.len(), 3);
    let query = &backend.received("fetch_recipes_by_category.php")[0].query;
    assert_eq!(query.get("category_id").map(String::as_str), Some("5"));
}

#[tokio::test]
async fn test_restaurant_name_falls_back() {
    let backend = FakeBackend::start().await;
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    assert_eq!(
        ctx.catalog().restaurant_name(RestaurantId::new(3)).await,
        UNKNOWN_RESTAURANT
    );

    backend.reply(
        "get_restaurant.php",
        Reply::json(fixtures::ok(json!({ "id": 3, "name": "Mama Put" }))),
    );
    assert_eq!(
        ctx.catalog().restaurant_name(RestaurantId::new(3)).await,
        "Mama Put"
    );
    assert_eq!(
        ctx.catalog().restaurant_name(RestaurantId::new(3)).await,
        "Mama Put"
    );
    assert_eq!(backend.calls("get_restaurant.php"), 2);
}

#[tokio::test]
async fn test_missing_recipe_is_an_error() {
    let backend = FakeBackend::start().await;
    backend.reply(
        "get_recipe.php",
        Reply::json(json!({ "success": false, "message": "Recipe not found" })),
    );
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    let err = ctx.catalog().recipe(RecipeId::new(99)).await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected { ref message } if message == "Recipe not found"));
}

#[tokio::test]
async fn test_non_json_and_empty_responses() {
    let backend = FakeBackend::start().await;
    backend.reply("get_recipes.php", Reply::html("<br /><b>Warning</b>"));
    backend.reply("get_categories.php", Reply::empty());
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    assert!(matches!(
        ctx.api().get_recipes().await,
        Err(ApiError::InvalidContentType(_))
    ));
    assert!(matches!(
        ctx.api().get_categories().await,
        Err(ApiError::EmptyResponse)
    ));
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_add_from_catalog_and_adjust() {
    let backend = FakeBackend::start().await;
    backend.reply(
        "get_recipe.php",
        Reply::json(fixtures::ok(fixtures::recipe(2, "Suya", "1,200.50", 3))),
    );
    let ctx = backend.context(Arc::new(MemoryStore::new()));

    let recipe = ctx.catalog().recipe(RecipeId::new(2)).await.unwrap();
    let mut cart = ctx.cart().await.unwrap();
    assert_eq!(
        cart.add(CartItem::from_recipe(&recipe)).await.unwrap(),
        AddOutcome::Added
    );
    assert_eq!(
        cart.add(CartItem::from_recipe(&recipe)).await.unwrap(),
        AddOutcome::AlreadyInCart
    );

    assert_eq!(cart.set_quantity(RecipeId::new(2), 1).await.unwrap(), 2);
    assert_eq!(cart.set_quantity(RecipeId::new(2), -5).await.unwrap(), 1);
    assert!(matches!(
        cart.set_quantity(RecipeId::new(8), 1).await,
        Err(CartError::NotInCart(_))
    ));

    // A fresh manager sees the stored cart
    let reloaded = ctx.cart().await.unwrap();
    assert_eq!(reloaded.items().len(), 1);
    assert_eq!(reloaded.subtotal().to_fixed(), "1200.50");
}

#[tokio::test]
async fn test_cart_survives_restart_on_disk() {
    let backend = FakeBackend::start().await;
    let path: PathBuf = std::env::temp_dir().join(format!(
        "cravii-it-cart-{}-{}.json",
        std::process::id(),
        backend.base_url().port().unwrap()
    ));
    let config = ClientConfig {
        store_path: path.clone(),
        ..backend.config()
    };

    {
        let ctx = ClientContext::new(config.clone()).unwrap();
        let mut cart = ctx.cart().await.unwrap();
        cart.add(cart_item(1, "1000", 1, 3)).await.unwrap();
        cart.add(cart_item(2, "500", 1, 3)).await.unwrap();
        cart.remove(RecipeId::new(1)).await.unwrap();
    }

    let ctx = ClientContext::new(config).unwrap();
    let cart = ctx.cart().await.unwrap();
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].id, RecipeId::new(2));

    let _ = std::fs::remove_file(path);
}
