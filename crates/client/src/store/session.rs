//! The logged-in session.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use cravii_core::UserId;

use super::{KEY_EMAIL, KEY_LOGIN_TIME, KEY_USER_ID, KeyValueStore, StoreError};

/// What is remembered about the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: Option<String>,
    pub login_time: Option<DateTime<Utc>>,
}

/// Typed access to the `id`, `email`, and `loginTime` keys.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored user id. Missing or unparseable ids both mean logged out.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    pub async fn current_user_id(&self) -> Result<Option<UserId>, StoreError> {
        let raw = self.store.get(KEY_USER_ID).await?;
        Ok(raw.and_then(|id| match id.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(stored = %id, "Ignoring unparseable stored user id");
                None
            }
        }))
    }

    /// The full stored session, if a user id is present.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    pub async fn load(&self) -> Result<Option<Session>, StoreError> {
        let Some(user_id) = self.current_user_id().await? else {
            return Ok(None);
        };
        let email = self.store.get(KEY_EMAIL).await?;
        let login_time = self
            .store
            .get(KEY_LOGIN_TIME)
            .await?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|t| t.with_timezone(&Utc));

        Ok(Some(Session {
            user_id,
            email,
            login_time,
        }))
    }

    /// Remember a successful login.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn save_login(
        &self,
        user_id: UserId,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.store
            .multi_set(vec![
                (KEY_USER_ID.to_string(), user_id.to_string()),
                (KEY_EMAIL.to_string(), email.to_string()),
                (
                    KEY_LOGIN_TIME.to_string(),
                    at.to_rfc3339_opts(SecondsFormat::Millis, true),
                ),
            ])
            .await
    }

    /// Forget only the user id, forcing a fresh login on the next screen.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn clear_user_id(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_USER_ID).await
    }

    /// Log out. The cart is left alone.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store
            .multi_remove(&[KEY_USER_ID, KEY_EMAIL, KEY_LOGIN_TIME])
            .await
    }
}

impl std::fmt::Debug for SessionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRepository").finish_non_exhaustive()
    }
}
