//! Cart manager.
//!
//! Holds the working copy of the cart and writes the whole list through to
//! the store on every change. The store is written first; if that fails the
//! in-memory list is left as it was, so what the customer sees is always what
//! is persisted.

use cravii_core::{CartItem, Money, RecipeId, RestaurantId, cart::distinct_restaurants};
use thiserror::Error;
use tracing::instrument;

use crate::store::{CartRepository, StoreError};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Recipe {0} is not in the cart")]
    NotInCart(RecipeId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of [`CartManager::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The recipe was already in the cart; its quantity was left unchanged.
    AlreadyInCart,
}

/// The customer's cart.
#[derive(Debug)]
pub struct CartManager {
    repo: CartRepository,
    items: Vec<CartItem>,
}

impl CartManager {
    /// Load the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the stored cart cannot be read.
    pub async fn load(repo: CartRepository) -> Result<Self, CartError> {
        let items = repo.load().await?;
        Ok(Self { repo, items })
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals, before fees.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Restaurants the cart draws from; checkout needs exactly one.
    #[must_use]
    pub fn restaurants(&self) -> Vec<RestaurantId> {
        distinct_restaurants(&self.items).into_iter().collect()
    }

    /// Add a line. A recipe already in the cart is refused rather than merged.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the cart cannot be saved.
    #[instrument(skip(self, item), fields(recipe_id = %item.id))]
    pub async fn add(&mut self, item: CartItem) -> Result<AddOutcome, CartError> {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return Ok(AddOutcome::AlreadyInCart);
        }

        let mut next = self.items.clone();
        next.push(CartItem {
            quantity: item.quantity.max(1),
            ..item
        });
        self.commit(next).await?;
        Ok(AddOutcome::Added)
    }

    /// Change a line's quantity by `delta`, never going below 1.
    ///
    /// Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` for an unknown recipe, or
    /// `CartError::Store` if the cart cannot be saved.
    #[instrument(skip(self))]
    pub async fn set_quantity(&mut self, id: RecipeId, delta: i32) -> Result<u32, CartError> {
        let mut next = self.items.clone();
        let line = next
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CartError::NotInCart(id))?;

        let current = i64::from(line.quantity);
        let wanted = (current + i64::from(delta)).max(1);
        line.quantity = u32::try_from(wanted).unwrap_or(u32::MAX);
        let quantity = line.quantity;

        self.commit(next).await?;
        Ok(quantity)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` for an unknown recipe, or
    /// `CartError::Store` if the cart cannot be saved.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, id: RecipeId) -> Result<(), CartError> {
        if !self.items.iter().any(|item| item.id == id) {
            return Err(CartError::NotInCart(id));
        }
        let next = self.items.iter().filter(|item| item.id != id).cloned().collect();
        self.commit(next).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the stored cart cannot be removed.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        self.repo.clear().await?;
        self.items.clear();
        Ok(())
    }

    async fn commit(&mut self, next: Vec<CartItem>) -> Result<(), CartError> {
        self.repo.save(&next).await?;
        self.items = next;
        Ok(())
    }
}
