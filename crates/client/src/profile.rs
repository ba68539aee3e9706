//! Profile viewing and editing.

use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiClient, ApiError, ProfileUpdate, User};
use crate::store::{SessionRepository, StoreError};

/// Shown when the backend accepts an update without a message.
pub const UPDATE_SUCCESS_MESSAGE: &str = "Profile updated successfully!";
/// Shown when the backend refuses an update without a message.
pub const UPDATE_FAILURE_MESSAGE: &str = "Failed to update profile. Please try again.";

/// Errors from profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Please log in to view your profile.")]
    NotLoggedIn,

    /// The backend refused the update; the message is its reason.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: String,
    pub location: String,
    pub gender: String,
    pub referral_code: String,
}

impl From<&User> for ProfileFields {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            location: user.location.clone(),
            gender: user.gender.clone(),
            referral_code: user.referral_code.clone(),
        }
    }
}

/// The logged-in user's profile.
#[derive(Debug, Clone)]
pub struct ProfileService {
    api: ApiClient,
    sessions: SessionRepository,
}

impl ProfileService {
    pub const fn new(api: ApiClient, sessions: SessionRepository) -> Self {
        Self { api, sessions }
    }

    /// Fetch the logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a network call when no session is
    /// stored, or the API error.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<User, ProfileError> {
        let user_id = self
            .sessions
            .current_user_id()
            .await?
            .ok_or(ProfileError::NotLoggedIn)?;
        Ok(self.api.get_user(user_id).await?)
    }

    /// Save profile fields. Returns the message to show the customer.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with the server's reason, `NotLoggedIn`, or the
    /// API error.
    #[instrument(skip(self, fields))]
    pub async fn update(&self, fields: ProfileFields) -> Result<String, ProfileError> {
        let id = self
            .sessions
            .current_user_id()
            .await?
            .ok_or(ProfileError::NotLoggedIn)?;

        let update = ProfileUpdate {
            id,
            name: fields.name.trim().to_string(),
            location: fields.location.trim().to_string(),
            gender: fields.gender.trim().to_string(),
            referral_code: fields.referral_code.trim().to_string(),
        };
        let response = self.api.update_profile(&update).await?;
        let message = response.message.filter(|m| !m.is_empty());

        if response.success {
            tracing::info!(user_id = %id, "Profile updated");
            Ok(message.unwrap_or_else(|| UPDATE_SUCCESS_MESSAGE.to_string()))
        } else {
            let reason = message.unwrap_or_else(|| UPDATE_FAILURE_MESSAGE.to_string());
            tracing::warn!(user_id = %id, reason = %reason, "Profile update refused");
            Err(ProfileError::Rejected(reason))
        }
    }
}
