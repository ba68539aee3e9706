//! Account, profile, and referral endpoints.

use cravii_core::{Email, UserId};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::types::{
    Envelope, LoginRequest, LoginResponse, MessageResponse, ProfileUpdate, Referral,
    ReferralCodeUpdate, SignupRequest, SignupResponse, User,
};
use super::{ApiClient, ApiError};

// =============================================================================
// ApiClient User Methods
// =============================================================================

impl ApiClient {
    /// Fetch a user profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the backend does not know the user, or
    /// any transport/format error.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        let envelope: Envelope<User> = self
            .get("get_user.php", &[("id", id.to_string())])
            .await?;
        envelope.into_data("Failed to fetch user data")
    }

    /// Save profile fields. The backend's `{success, message}` answer is
    /// returned as-is so the caller can show its message either way.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport/format failures.
    #[instrument(skip(self, update), fields(user_id = %update.id))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<MessageResponse, ApiError> {
        self.post("update_profile.php", update).await
    }

    /// Store a new referral code for a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the backend refuses the code.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn update_referral_code(&self, id: UserId, referral_code: &str) -> Result<(), ApiError> {
        let response: MessageResponse = self
            .post(
                "update_referral_code.php",
                &ReferralCodeUpdate { id, referral_code },
            )
            .await?;
        if response.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| "Failed to update referral code".to_string()),
            })
        }
    }

    /// Users who signed up with this user's referral code.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the backend refuses the request.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_referrals(&self, id: UserId) -> Result<Vec<Referral>, ApiError> {
        let envelope: Envelope<Vec<Referral>> = self
            .get("get_referrals.php", &[("id", id.to_string())])
            .await?;
        envelope.into_data_or_default("Failed to load referrals")
    }

    /// Authenticate. On success the backend also sets the PHP session cookie
    /// that later checkout calls rely on.
    ///
    /// # Errors
    ///
    /// Wrong credentials usually arrive as `Unauthorized` or `Status` carrying
    /// the server's reason.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<LoginResponse, ApiError> {
        self.post(
            "login.php",
            &LoginRequest {
                email: email.as_str(),
                password: password.expose_secret(),
            },
        )
        .await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// A refused registration arrives as `Status` carrying the server's reason.
    #[instrument(skip(self, password, confirm_password))]
    pub async fn signup(
        &self,
        email: &str,
        password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<SignupResponse, ApiError> {
        self.post(
            "signup.php",
            &SignupRequest {
                email,
                password: password.expose_secret(),
                confirm_password: confirm_password.expose_secret(),
            },
        )
        .await
    }
}
