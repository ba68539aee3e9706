//! Profile and referral commands.

use cravii_client::ClientContext;
use cravii_client::profile::ProfileFields;
use cravii_client::referrals::{earned_tiers, next_tier};

use super::CommandError;

/// Fields given on the command line; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub location: Option<String>,
    pub gender: Option<String>,
    pub referral_code: Option<String>,
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

pub async fn show(ctx: &ClientContext) -> Result<(), CommandError> {
    let user = ctx.profile().load().await?;
    println!("Name:          {}", or_dash(&user.name));
    println!("Email:         {}", or_dash(&user.email));
    println!("Location:      {}", or_dash(&user.location));
    println!("Gender:        {}", or_dash(&user.gender));
    println!("Referral code: {}", or_dash(&user.referral_code));
    Ok(())
}

/// Merge the changes into the current profile and save it.
pub async fn update(ctx: &ClientContext, changes: ProfileChanges) -> Result<(), CommandError> {
    let profile = ctx.profile();
    let current = profile.load().await?;
    let mut fields = ProfileFields::from(&current);

    if let Some(name) = changes.name {
        fields.name = name;
    }
    if let Some(location) = changes.location {
        fields.location = location;
    }
    if let Some(gender) = changes.gender {
        fields.gender = gender;
    }
    if let Some(referral_code) = changes.referral_code {
        fields.referral_code = referral_code;
    }

    let message = profile.update(fields).await?;
    println!("{message}");
    Ok(())
}

pub async fn referrals(ctx: &ClientContext) -> Result<(), CommandError> {
    let service = ctx.referrals();
    let code = service.ensure_code().await?;
    let names = service.referrals().await?;

    println!("Your referral code: {code}");
    println!("Referrals: {}", names.len());
    for name in &names {
        println!("  - {name}");
    }

    for tier in earned_tiers(names.len()) {
        println!("Earned: {} for {} referrals", tier.reward, tier.referrals);
    }
    match next_tier(names.len()) {
        Some(tier) => println!(
            "Next reward: {} at {} referrals ({} to go)",
            tier.reward,
            tier.referrals,
            tier.referrals - names.len()
        ),
        None => println!("Every reward unlocked!"),
    }
    Ok(())
}
