//! Recipe, category, and restaurant endpoints.

use cravii_core::{Category, CategoryId, Recipe, RecipeId, Restaurant, RestaurantId};
use tracing::instrument;

use super::types::Envelope;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// All recipes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails or the backend reports failure.
    #[instrument(skip(self))]
    pub async fn get_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        let envelope: Envelope<Vec<Recipe>> = self.get("get_recipes.php", &[]).await?;
        envelope.into_data_or_default("Failed to fetch recipes")
    }

    /// One recipe.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the recipe does not exist.
    #[instrument(skip(self), fields(recipe_id = %id))]
    pub async fn get_recipe(&self, id: RecipeId) -> Result<Recipe, ApiError> {
        let envelope: Envelope<Recipe> = self
            .get("get_recipe.php", &[("id", id.to_string())])
            .await?;
        envelope.into_data("Recipe not found")
    }

    /// One restaurant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the restaurant does not exist.
    #[instrument(skip(self), fields(restaurant_id = %id))]
    pub async fn get_restaurant(&self, id: RestaurantId) -> Result<Restaurant, ApiError> {
        let envelope: Envelope<Restaurant> = self
            .get("get_restaurant.php", &[("id", id.to_string())])
            .await?;
        envelope.into_data("Restaurant not found")
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails or the backend reports failure.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let envelope: Envelope<Vec<Category>> = self.get("get_categories.php", &[]).await?;
        envelope.into_data_or_default("Failed to fetch categories")
    }

    /// Recipes in one category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails or the backend reports failure.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn recipes_by_category(&self, id: CategoryId) -> Result<Vec<Recipe>, ApiError> {
        let envelope: Envelope<Vec<Recipe>> = self
            .get(
                "fetch_recipes_by_category.php",
                &[("category_id", id.to_string())],
            )
            .await?;
        envelope.into_data_or_default("Failed to fetch recipes.")
    }
}
