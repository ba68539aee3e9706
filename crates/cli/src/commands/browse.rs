//! Menu browsing commands.

use cravii_client::ClientContext;
use cravii_client::catalog::{self, EXPLORE_LIMIT, POPULAR_LIMIT, SHUFFLE_LIMIT, SUGGESTION_LIMIT};
use cravii_core::{CategoryId, Money, Recipe, RecipeId, RestaurantId};

use super::CommandError;

fn print_recipe_line(recipe: &Recipe) {
    println!(
        "{:>6}  {:<32} {:>12}  restaurant {}",
        recipe.id.to_string(),
        recipe.name,
        Money::parse(&recipe.price).to_string(),
        recipe.restaurant_id
    );
}

/// List recipes, optionally searched and filtered.
///
/// Without a query, shows the popular strip and a shuffled selection. With a
/// query, shows matches, name suggestions, and a few other dishes to explore.
pub async fn recipes(
    ctx: &ClientContext,
    query: Option<&str>,
    restaurant: Option<i64>,
    category: Option<i64>,
) {
    let recipes = match category {
        Some(id) => ctx.catalog().recipes_in_category(CategoryId::new(id)).await,
        None => ctx.catalog().recipes().await,
    };
    let restaurant = restaurant.map(RestaurantId::new);
    let mut rng = rand::rng();

    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => {
            let results = catalog::filter_recipes(&recipes, query, restaurant);
            if results.is_empty() {
                println!("No recipes match \"{query}\"");
                let names = catalog::suggestions(&recipes, query, SUGGESTION_LIMIT);
                if !names.is_empty() {
                    println!("Did you mean: {}", names.join(", "));
                }
            } else {
                for recipe in &results {
                    print_recipe_line(recipe);
                }
            }

            let extra = catalog::explore(&recipes, &results, EXPLORE_LIMIT, &mut rng);
            if !extra.is_empty() {
                println!("\nExplore more:");
                for recipe in extra {
                    print_recipe_line(recipe);
                }
            }
        }
        None => {
            let pool: Vec<Recipe> = catalog::filter_recipes(&recipes, "", restaurant)
                .into_iter()
                .cloned()
                .collect();
            if pool.is_empty() {
                println!("No recipes available");
                return;
            }

            println!("Popular:");
            for recipe in catalog::popular(&pool, POPULAR_LIMIT) {
                print_recipe_line(recipe);
            }
            println!("\nMore to try:");
            for recipe in catalog::shuffle_sample(&pool, SHUFFLE_LIMIT, &mut rng) {
                print_recipe_line(recipe);
            }
        }
    }
}

/// Show one recipe with its restaurant's name.
pub async fn recipe(ctx: &ClientContext, id: i64) -> Result<(), CommandError> {
    let recipe = ctx.catalog().recipe(RecipeId::new(id)).await?;
    let restaurant = ctx.catalog().restaurant_name(recipe.restaurant_id).await;

    println!("{} (#{})", recipe.name, recipe.id);
    println!("Price:      {}", Money::parse(&recipe.price));
    println!("Restaurant: {restaurant}");
    if !recipe.description.is_empty() {
        println!("\n{}", recipe.description);
    }
    Ok(())
}

pub async fn categories(ctx: &ClientContext) {
    let categories = ctx.catalog().categories().await;
    if categories.is_empty() {
        println!("No categories available");
    }
    for category in categories.iter() {
        println!("{:>6}  {}", category.id.to_string(), category.name);
    }
}
