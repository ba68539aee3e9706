//! Cart line items and the catalog reference data they are built from.
//!
//! Field names follow the wire format of the Cravii API and the persisted
//! cart (`restaurantId` is camelCase there, everything else snake_case).

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Money, RecipeId, RestaurantId};

/// A recipe (menu item) as served by `get_recipe.php` / `get_recipes.php`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub description: String,
    #[serde(deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: RestaurantId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// A recipe category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A restaurant, as served by `get_restaurant.php`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
}

/// One line in the cart.
///
/// A line is identified by its recipe id; the same recipe never appears
/// twice. `price` is kept as the string the catalog served so the persisted
/// cart round-trips untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: RecipeId,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: RestaurantId,
    pub quantity: u32,
}

impl CartItem {
    /// A fresh line for `recipe` with quantity 1.
    #[must_use]
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            price: recipe.price.clone(),
            image_url: recipe.image_url.clone(),
            restaurant_id: recipe.restaurant_id,
            quantity: 1,
        }
    }

    /// Parsed unit price. Malformed prices are zero.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        Money::parse(&self.price)
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

/// The set of restaurants a cart draws from. An orderable cart has exactly one.
#[must_use]
pub fn distinct_restaurants(items: &[CartItem]) -> BTreeSet<RestaurantId> {
    items.iter().map(|item| item.restaurant_id).collect()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
