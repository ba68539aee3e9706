//! Recipe and category browsing.
//!
//! Reference data is cached for 5 minutes and list fetches never fail:
//! browsing must keep working when the backend is flaky, so a failed list
//! fetch is logged and shows as an empty list. Recipe detail errors do
//! propagate, since there is nothing to show without the recipe.

use std::sync::Arc;
use std::time::Duration;

use cravii_core::{Category, CategoryId, Recipe, RecipeId, RestaurantId};
use moka::future::Cache;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::api::{ApiClient, ApiError};

/// Shown when a restaurant's name cannot be fetched.
pub const UNKNOWN_RESTAURANT: &str = "Unknown Restaurant";

/// Recipes shown on the home screen's shuffled grid.
pub const SHUFFLE_LIMIT: usize = 20;
/// Name suggestions shown while typing.
pub const SUGGESTION_LIMIT: usize = 5;
/// Random picks shown under search results.
pub const EXPLORE_LIMIT: usize = 10;
/// Recipes in the popular strip.
pub const POPULAR_LIMIT: usize = 5;

#[derive(Debug, Clone)]
enum CacheValue {
    Recipes(Arc<Vec<Recipe>>),
    Categories(Arc<Vec<Category>>),
    RestaurantName(Arc<str>),
}

/// Cached access to recipes, categories, and restaurant names.
#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        Self { api, cache }
    }

    /// Every recipe. Empty on failure.
    #[instrument(skip(self))]
    pub async fn recipes(&self) -> Arc<Vec<Recipe>> {
        let key = "recipes".to_string();
        if let Some(CacheValue::Recipes(recipes)) = self.cache.get(&key).await {
            debug!("Cache hit for recipes");
            return recipes;
        }

        self.cached_list(key, self.api.get_recipes().await, "recipes", CacheValue::Recipes)
            .await
    }

    /// Every category. Empty on failure.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Arc<Vec<Category>> {
        let key = "categories".to_string();
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&key).await {
            debug!("Cache hit for categories");
            return categories;
        }

        self.cached_list(
            key,
            self.api.get_categories().await,
            "categories",
            CacheValue::Categories,
        )
        .await
    }

    /// Recipes in one category. Empty on failure.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn recipes_in_category(&self, id: CategoryId) -> Arc<Vec<Recipe>> {
        let key = format!("category:{id}");
        if let Some(CacheValue::Recipes(recipes)) = self.cache.get(&key).await {
            debug!("Cache hit for category recipes");
            return recipes;
        }

        self.cached_list(
            key,
            self.api.recipes_by_category(id).await,
            "category recipes",
            CacheValue::Recipes,
        )
        .await
    }

    /// One recipe, always fetched fresh.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the recipe cannot be fetched.
    pub async fn recipe(&self, id: RecipeId) -> Result<Recipe, ApiError> {
        self.api.get_recipe(id).await
    }

    /// A restaurant's display name, or [`UNKNOWN_RESTAURANT`].
    #[instrument(skip(self), fields(restaurant_id = %id))]
    pub async fn restaurant_name(&self, id: RestaurantId) -> String {
        let key = format!("restaurant:{id}");
        if let Some(CacheValue::RestaurantName(name)) = self.cache.get(&key).await {
            return name.to_string();
        }

        match self.api.get_restaurant(id).await {
            Ok(restaurant) => {
                self.cache
                    .insert(key, CacheValue::RestaurantName(restaurant.name.as_str().into()))
                    .await;
                restaurant.name
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch restaurant");
                UNKNOWN_RESTAURANT.to_string()
            }
        }
    }

    /// Drop everything cached.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    async fn cached_list<T>(
        &self,
        key: String,
        fetched: Result<Vec<T>, ApiError>,
        what: &str,
        wrap: fn(Arc<Vec<T>>) -> CacheValue,
    ) -> Arc<Vec<T>> {
        match fetched {
            Ok(list) => {
                let list = Arc::new(list);
                self.cache.insert(key, wrap(Arc::clone(&list))).await;
                list
            }
            Err(e) => {
                // Failures are not cached so the next call tries again
                tracing::warn!(error = %e, "Failed to fetch {what}, showing none");
                Arc::new(Vec::new())
            }
        }
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("cached_entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Browsing helpers
// =============================================================================

/// Recipes whose name or description contains `query` (case-insensitive),
/// optionally restricted to one restaurant.
#[must_use]
pub fn filter_recipes<'a>(
    recipes: &'a [Recipe],
    query: &str,
    restaurant: Option<RestaurantId>,
) -> Vec<&'a Recipe> {
    let needle = query.trim().to_lowercase();
    recipes
        .iter()
        .filter(|recipe| {
            recipe.name.to_lowercase().contains(&needle)
                || recipe.description.to_lowercase().contains(&needle)
        })
        .filter(|recipe| restaurant.is_none_or(|id| recipe.restaurant_id == id))
        .collect()
}

/// Names of up to `limit` recipes whose name contains `query`. A blank query
/// suggests nothing.
#[must_use]
pub fn suggestions<'a>(recipes: &'a [Recipe], query: &str, limit: usize) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    recipes
        .iter()
        .filter(|recipe| recipe.name.to_lowercase().contains(&needle))
        .map(|recipe| recipe.name.as_str())
        .take(limit)
        .collect()
}

/// Up to `limit` recipes in random order.
pub fn shuffle_sample<'a, R: Rng + ?Sized>(
    recipes: &'a [Recipe],
    limit: usize,
    rng: &mut R,
) -> Vec<&'a Recipe> {
    let mut picked: Vec<&Recipe> = recipes.iter().collect();
    picked.shuffle(rng);
    picked.truncate(limit);
    picked
}

/// Up to `limit` random recipes that are not already among `results`.
pub fn explore<'a, R: Rng + ?Sized>(
    all: &'a [Recipe],
    results: &[&Recipe],
    limit: usize,
    rng: &mut R,
) -> Vec<&'a Recipe> {
    let mut rest: Vec<&Recipe> = all
        .iter()
        .filter(|recipe| !results.iter().any(|r| r.id == recipe.id))
        .collect();
    rest.shuffle(rng);
    rest.truncate(limit);
    rest
}

/// The first `limit` recipes, in backend order.
#[must_use]
pub fn popular(recipes: &[Recipe], limit: usize) -> &[Recipe] {
    recipes.get(..limit).unwrap_or(recipes)
}
