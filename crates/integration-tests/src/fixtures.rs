//! Response bodies shaped like the PHP backend's.

use cravii_core::{CartItem, RecipeId, RestaurantId};
use serde_json::{Value, json};

/// `get_user.php` for a user living in `location`.
#[must_use]
pub fn user(id: i64, location: &str) -> Value {
    json!({
        "success": true,
        "data": {
            "id": id,
            "name": "Ada Obi",
            "email": "ada@cravii.ng",
            "location": location,
            "gender": "female",
            "referral_code": null
        }
    })
}

/// `fetch_fee.php`. The backend serves the amounts as strings.
#[must_use]
pub fn fee(vat: u32, delivery: u32) -> Value {
    json!({
        "success": true,
        "data": { "vat_fee": vat.to_string(), "delivery_fee": delivery.to_string() }
    })
}

/// One recipe as listed by `get_recipes.php`.
#[must_use]
pub fn recipe(id: i64, name: &str, price: &str, restaurant: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name}, freshly made"),
        "price": price,
        "image_url": null,
        "restaurantId": restaurant
    })
}

/// Wrap `data` in a success envelope.
#[must_use]
pub fn ok(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// A cart line.
#[must_use]
pub fn cart_item(id: i64, price: &str, quantity: u32, restaurant: i64) -> CartItem {
    CartItem {
        id: RecipeId::new(id),
        name: format!("Dish {id}"),
        price: price.to_string(),
        image_url: None,
        restaurant_id: RestaurantId::new(restaurant),
        quantity,
    }
}
