//! Subcommand implementations.
//!
//! Results go to stdout; progress and diagnostics go through `tracing`.

pub mod account;
pub mod browse;
pub mod cart;
pub mod checkout;
pub mod profile;

use std::io::{self, BufRead, Write};

use cravii_client::api::ApiError;
use cravii_client::auth::AuthError;
use cravii_client::cart::CartError;
use cravii_client::checkout::CheckoutError;
use cravii_client::config::ConfigError;
use cravii_client::profile::ProfileError;
use cravii_client::referrals::ReferralError;
use thiserror::Error;

/// Errors surfaced by any subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Referral(#[from] ReferralError),

    #[error("Failed to read input: {0}")]
    Input(#[from] io::Error),
}

/// Print `prompt` to stderr and read one trimmed line from stdin.
///
/// Returns `None` at end of input.
pub(crate) fn prompt_line(prompt: &str) -> io::Result<Option<String>> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
