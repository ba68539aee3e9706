//! Cart commands.

use cravii_client::ClientContext;
use cravii_client::cart::{AddOutcome, CartManager};
use cravii_core::{CartItem, RecipeId};

use super::CommandError;

fn print_cart(cart: &CartManager) {
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for item in cart.items() {
        println!(
            "{:>6}  {:<32} {:>3} x {:>12} = {:>12}",
            item.id.to_string(),
            item.name,
            item.quantity,
            item.unit_price().to_string(),
            item.line_total().to_string()
        );
    }
    println!("Subtotal: {}", cart.subtotal());
    if cart.restaurants().len() > 1 {
        println!("Note: items come from several restaurants; checkout needs just one.");
    }
}

pub async fn list(ctx: &ClientContext) -> Result<(), CommandError> {
    print_cart(&ctx.cart().await?);
    Ok(())
}

/// Add a recipe fetched from the catalog.
pub async fn add(ctx: &ClientContext, id: i64) -> Result<(), CommandError> {
    let recipe = ctx.catalog().recipe(RecipeId::new(id)).await?;
    let mut cart = ctx.cart().await?;

    match cart.add(CartItem::from_recipe(&recipe)).await? {
        AddOutcome::Added => println!("Added {} to your cart", recipe.name),
        AddOutcome::AlreadyInCart => {
            println!("{} is already in your cart; use `cravii cart inc {id}`", recipe.name);
        }
    }
    Ok(())
}

pub async fn change_quantity(ctx: &ClientContext, id: i64, delta: i32) -> Result<(), CommandError> {
    let mut cart = ctx.cart().await?;
    let quantity = cart.set_quantity(RecipeId::new(id), delta).await?;
    println!("Quantity is now {quantity}");
    Ok(())
}

pub async fn remove(ctx: &ClientContext, id: i64) -> Result<(), CommandError> {
    let mut cart = ctx.cart().await?;
    cart.remove(RecipeId::new(id)).await?;
    print_cart(&cart);
    Ok(())
}

pub async fn clear(ctx: &ClientContext) -> Result<(), CommandError> {
    ctx.cart().await?.clear().await?;
    println!("Cart cleared");
    Ok(())
}
