//! The persisted cart.

use std::sync::Arc;

use cravii_core::CartItem;

use super::{KEY_CART, KeyValueStore, StoreError};

/// Typed access to the `cart` key.
#[derive(Clone)]
pub struct CartRepository {
    store: Arc<dyn KeyValueStore>,
}

impl CartRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored cart. A missing key is an empty cart, and stored
    /// quantities below 1 are read as 1.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serde` if the stored cart is not a valid item list.
    pub async fn load(&self) -> Result<Vec<CartItem>, StoreError> {
        let mut items: Vec<CartItem> = match self.store.get(KEY_CART).await? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)?,
            _ => return Ok(Vec::new()),
        };
        for item in &mut items {
            item.quantity = item.quantity.max(1);
        }
        Ok(items)
    }

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn save(&self, items: &[CartItem]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;
        self.store.set(KEY_CART, json).await
    }

    /// Remove the stored cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_CART).await
    }
}

impl std::fmt::Debug for CartRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartRepository").finish_non_exhaustive()
    }
}
