//! On-device key-value persistence.
//!
//! Everything the client remembers between runs lives in a flat string
//! key-value store: the logged-in user's id, email, and login time, and the
//! cart as a JSON array. [`KeyValueStore`] is the storage seam;
//! [`SessionRepository`] and [`CartRepository`] give the stored values types.

mod cart;
mod file;
mod memory;
mod session;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use cart::CartRepository;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::{Session, SessionRepository};

/// Key holding the logged-in user's id.
pub const KEY_USER_ID: &str = "id";
/// Key holding the logged-in user's email.
pub const KEY_EMAIL: &str = "email";
/// Key holding the RFC 3339 login timestamp.
pub const KEY_LOGIN_TIME: &str = "loginTime";
/// Key holding the cart as a JSON array.
pub const KEY_CART: &str = "cart";

/// Errors from the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Async string key-value storage.
///
/// Writes must be durable when the returned future resolves.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Set several keys in one write.
    async fn multi_set(&self, entries: Vec<(String, String)>) -> Result<(), StoreError>;

    /// Remove several keys in one write.
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    #[inline]
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    #[inline]
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }

    #[inline]
    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key).await
    }

    #[inline]
    async fn multi_set(&self, entries: Vec<(String, String)>) -> Result<(), StoreError> {
        (**self).multi_set(entries).await
    }

    #[inline]
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        (**self).multi_remove(keys).await
    }
}
