//! Cravii Core - Shared types and pricing.
//!
//! This crate provides the types used across all Cravii components:
//! - `client` - Remote API client, cart, and checkout orchestration
//! - `cli` - Command-line front end for ordering
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and makes pricing trivially
//! testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and payment status
//! - [`cart`] - Cart line items and catalog reference data
//! - [`pricing`] - Checkout totals (subtotal, VAT, processor fee, delivery)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod pricing;
pub mod types;

pub use cart::{CartItem, Category, Recipe, Restaurant};
pub use pricing::{FeeSchedule, Totals, recompute_totals};
pub use types::*;
