//! Login, signup, and logout.

use chrono::Utc;
use cravii_core::{Email, EmailError};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiClient, ApiError};
use crate::store::{Session, SessionRepository, StoreError};

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email is required")]
    EmailRequired,

    #[error("Please enter a valid email address")]
    InvalidEmail(#[source] EmailError),

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("All fields are required")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The backend refused the request; the message is its reason.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Account operations.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
    sessions: SessionRepository,
}

impl AuthService {
    pub const fn new(api: ApiClient, sessions: SessionRepository) -> Self {
        Self { api, sessions }
    }

    /// Log in and remember the session.
    ///
    /// The email is trimmed and lowercased, and both fields are checked
    /// before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `Rejected` with the server's reason
    /// (default "Invalid credentials"), or an API/store error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::EmailRequired);
        }
        let email = Email::parse_normalized(email).map_err(AuthError::InvalidEmail)?;
        validate_password(password)?;

        let response = match self.api.login(&email, password).await {
            Ok(response) => response,
            Err(e @ (ApiError::Unauthorized(_) | ApiError::Status { .. })) => {
                let reason = e.server_message().unwrap_or("Invalid credentials");
                tracing::info!(email = %email, reason, "Login refused");
                return Err(AuthError::Rejected(reason.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let Some(user) = response.user else {
            let reason = response
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Invalid credentials".to_string());
            tracing::info!(email = %email, reason = %reason, "Login refused");
            return Err(AuthError::Rejected(reason));
        };

        let login_time = Utc::now();
        self.sessions
            .save_login(user.id, email.as_str(), login_time)
            .await?;
        tracing::info!(user_id = %user.id, "Logged in");

        Ok(Session {
            user_id: user.id,
            email: Some(email.into_inner()),
            login_time: Some(login_time),
        })
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `Rejected` with the server's reason
    /// (default "Failed to register"), or an API error.
    #[instrument(skip(self, password, confirm_password))]
    pub async fn signup(
        &self,
        email: &str,
        password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<(), AuthError> {
        if email.trim().is_empty()
            || password.expose_secret().is_empty()
            || confirm_password.expose_secret().is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if password.expose_secret() != confirm_password.expose_secret() {
            return Err(AuthError::PasswordMismatch);
        }
        if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort);
        }

        match self.api.signup(email.trim(), password, confirm_password).await {
            Ok(response) if response.error.as_deref().is_none_or(str::is_empty) => {
                tracing::info!("Account created");
                Ok(())
            }
            Ok(response) => Err(AuthError::Rejected(response.error.unwrap_or_default())),
            Err(e @ (ApiError::Unauthorized(_) | ApiError::Status { .. })) => Err(
                AuthError::Rejected(e.server_message().unwrap_or("Failed to register").to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Forget the session. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the session cannot be removed.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.sessions.clear().await?;
        tracing::info!("Session cleared");
        Ok(())
    }

    /// The stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the store cannot be read.
    pub async fn restore(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.load().await?)
    }
}

fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    let password = password.expose_secret();
    if password.is_empty() {
        return Err(AuthError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}
