//! Cravii CLI - Order from Cravii restaurants from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password is read from stdin)
//! cravii login ada@example.com
//!
//! # Browse and fill the cart
//! cravii recipes --query rice
//! cravii cart add 12
//! cravii cart inc 12
//!
//! # See what the order will cost, then pay
//! cravii checkout quote --coupon SAVE20
//! cravii checkout pay --address "12 Admiralty Way" --phone 08030000000 --location Lekki
//! ```
//!
//! # Commands
//!
//! - `login`, `signup`, `logout`, `whoami` - Account
//! - `recipes`, `recipe`, `categories` - Browse the menu
//! - `cart` - Manage the cart
//! - `checkout quote`, `checkout pay` - Price and pay for the cart
//! - `profile`, `referrals` - Profile and referral program
//!
//! Configuration comes from the environment (see `cravii_client::config`).
//! Logs go to stderr; `RUST_LOG` overrides the default filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use cravii_client::{ClientConfig, ClientContext};
use tracing_subscriber::EnvFilter;

#[allow(clippy::print_stdout)]
mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "cravii")]
#[command(author, version, about = "Order food from Cravii")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in (password is read from stdin)
    Login {
        /// Account email address
        email: String,
    },
    /// Create an account (password is read from stdin twice)
    Signup {
        /// Account email address
        email: String,
    },
    /// Log out; the cart is kept
    Logout,
    /// Show the stored session
    Whoami,
    /// List recipes
    Recipes {
        /// Match recipe names and descriptions
        #[arg(short, long)]
        query: Option<String>,

        /// Only recipes from this restaurant id
        #[arg(short, long)]
        restaurant: Option<i64>,

        /// Only recipes in this category id
        #[arg(short, long)]
        category: Option<i64>,
    },
    /// Show one recipe
    Recipe {
        /// Recipe id
        id: i64,
    },
    /// List categories
    Categories,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Price and pay for the cart
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Show the referral code, referrals, and rewards
    Referrals,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    List,
    /// Add a recipe by id
    Add { id: i64 },
    /// Increase a line's quantity by one
    Inc { id: i64 },
    /// Decrease a line's quantity by one (never below one)
    Dec { id: i64 },
    /// Remove a line
    Remove { id: i64 },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Show the order total
    Quote {
        /// Coupon code to apply
        #[arg(long)]
        coupon: Option<String>,
    },
    /// Start payment; prints the payment page URL and waits for the final
    /// redirect URL on stdin
    Pay {
        /// Delivery address (defaults to the profile location)
        #[arg(long)]
        address: Option<String>,

        /// Contact phone number
        #[arg(long)]
        phone: String,

        /// Delivery area
        #[arg(long)]
        location: String,

        /// Coupon code to apply
        #[arg(long)]
        coupon: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile
    Show,
    /// Change profile fields; omitted fields keep their value
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        gender: Option<String>,

        #[arg(long)]
        referral_code: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cravii_client=info,cravii_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let config = ClientConfig::from_env()?;
    let ctx = ClientContext::new(config)?;

    match cli.command {
        Commands::Login { email } => commands::account::login(&ctx, &email).await?,
        Commands::Signup { email } => commands::account::signup(&ctx, &email).await?,
        Commands::Logout => commands::account::logout(&ctx).await?,
        Commands::Whoami => commands::account::whoami(&ctx).await?,
        Commands::Recipes {
            query,
            restaurant,
            category,
        } => commands::browse::recipes(&ctx, query.as_deref(), restaurant, category).await,
        Commands::Recipe { id } => commands::browse::recipe(&ctx, id).await?,
        Commands::Categories => commands::browse::categories(&ctx).await,
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(&ctx).await?,
            CartAction::Add { id } => commands::cart::add(&ctx, id).await?,
            CartAction::Inc { id } => commands::cart::change_quantity(&ctx, id, 1).await?,
            CartAction::Dec { id } => commands::cart::change_quantity(&ctx, id, -1).await?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, id).await?,
            CartAction::Clear => commands::cart::clear(&ctx).await?,
        },
        Commands::Checkout { action } => match action {
            CheckoutAction::Quote { coupon } => {
                commands::checkout::quote(&ctx, coupon.as_deref()).await?;
            }
            CheckoutAction::Pay {
                address,
                phone,
                location,
                coupon,
            } => {
                let details = commands::checkout::PayArgs {
                    address,
                    phone,
                    location,
                    coupon,
                };
                commands::checkout::pay(&ctx, details).await?;
            }
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&ctx).await?,
            ProfileAction::Update {
                name,
                location,
                gender,
                referral_code,
            } => {
                let changes = commands::profile::ProfileChanges {
                    name,
                    location,
                    gender,
                    referral_code,
                };
                commands::profile::update(&ctx, changes).await?;
            }
        },
        Commands::Referrals => commands::profile::referrals(&ctx).await?,
    }
    Ok(())
}
