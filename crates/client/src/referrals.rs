//! Referral program.
//!
//! Every customer gets a shareable code (`cravii` followed by three digits).
//! Rewards unlock as more people sign up with it.

use cravii_core::{Money, UserId};
use rand::Rng;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiClient, ApiError};
use crate::store::{SessionRepository, StoreError};

/// Prefix of every generated referral code.
pub const CODE_PREFIX: &str = "cravii";

/// Shown for referred users without a name.
pub const UNKNOWN_USER: &str = "Unknown User";

/// A reward unlocked at a referral count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardTier {
    pub referrals: usize,
    pub reward: Money,
}

/// Reward tiers, in ascending order.
pub const REWARD_TIERS: [RewardTier; 4] = [
    RewardTier {
        referrals: 50,
        reward: Money::new(Decimal::from_parts(10_000, 0, 0, false, 0)),
    },
    RewardTier {
        referrals: 100,
        reward: Money::new(Decimal::from_parts(25_000, 0, 0, false, 0)),
    },
    RewardTier {
        referrals: 500,
        reward: Money::new(Decimal::from_parts(150_000, 0, 0, false, 0)),
    },
    RewardTier {
        referrals: 1000,
        reward: Money::new(Decimal::from_parts(400_000, 0, 0, false, 0)),
    },
];

/// Errors from referral operations.
#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("Please log in to view referrals.")]
    NotLoggedIn,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Tiers already reached with `count` referrals.
#[must_use]
pub fn earned_tiers(count: usize) -> Vec<RewardTier> {
    REWARD_TIERS
        .iter()
        .copied()
        .filter(|tier| count >= tier.referrals)
        .collect()
}

/// The next tier to reach, or `None` once every tier is earned.
#[must_use]
pub fn next_tier(count: usize) -> Option<RewardTier> {
    REWARD_TIERS.iter().copied().find(|tier| count < tier.referrals)
}

/// A fresh referral code: the prefix and a number from 100 to 999.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{CODE_PREFIX}{}", rng.random_range(100..=999))
}

/// The logged-in user's referral code and referrals.
#[derive(Debug, Clone)]
pub struct ReferralService {
    api: ApiClient,
    sessions: SessionRepository,
}

impl ReferralService {
    pub const fn new(api: ApiClient, sessions: SessionRepository) -> Self {
        Self { api, sessions }
    }

    async fn user_id(&self) -> Result<UserId, ReferralError> {
        self.sessions
            .current_user_id()
            .await?
            .ok_or(ReferralError::NotLoggedIn)
    }

    /// The user's referral code, generating and saving one if they have none.
    ///
    /// # Errors
    ///
    /// Returns the API error if the user cannot be fetched or a new code
    /// cannot be saved.
    #[instrument(skip(self))]
    pub async fn ensure_code(&self) -> Result<String, ReferralError> {
        let user_id = self.user_id().await?;
        let user = self.api.get_user(user_id).await?;
        if !user.referral_code.trim().is_empty() {
            return Ok(user.referral_code);
        }

        let code = generate_code(&mut rand::rng());
        self.api.update_referral_code(user_id, &code).await?;
        tracing::info!(user_id = %user_id, code = %code, "Generated referral code");
        Ok(code)
    }

    /// Names of the people who signed up with the user's code.
    ///
    /// # Errors
    ///
    /// Returns the API error if the list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn referrals(&self) -> Result<Vec<String>, ReferralError> {
        let user_id = self.user_id().await?;
        let referrals = self.api.get_referrals(user_id).await?;
        Ok(referrals
            .into_iter()
            .map(|r| {
                if r.name.trim().is_empty() {
                    UNKNOWN_USER.to_string()
                } else {
                    r.name
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_generated_code_format() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let code = generate_code(&mut rng);
            let digits = code.strip_prefix(CODE_PREFIX).unwrap_or_default();
            assert_eq!(digits.len(), 3, "{code}");
            let n: u32 = digits.parse().unwrap_or_default();
            assert!((100..=999).contains(&n), "{code}");
        }
    }

    #[test]
    fn test_tiers() {
        assert!(earned_tiers(49).is_empty());
        assert_eq!(next_tier(0).map(|t| t.referrals), Some(50));

        let earned = earned_tiers(100);
        assert_eq!(earned.len(), 2);
        assert_eq!(earned[1].reward.to_fixed(), "25000.00");
        assert_eq!(next_tier(100).map(|t| t.referrals), Some(500));

        assert_eq!(earned_tiers(5000).len(), 4);
        assert_eq!(next_tier(1000), None);
    }
}
