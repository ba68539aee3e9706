//! Checkout pricing.
//!
//! [`recompute_totals`] is the single source of truth for every amount the
//! customer sees and every amount sent to the payment endpoint. It is pure:
//! call it again after any change to the cart, the fee schedule, or the
//! coupon flag instead of patching a previous result.
//!
//! # Formula
//!
//! | Component | Value |
//! |-----------|-------|
//! | subtotal | Σ unit price × quantity |
//! | VAT | `vat_fee` × number of line items, × 0.8 with a valid coupon |
//! | processor fee | subtotal × 1.5% + ₦100 when subtotal ≥ ₦2,500, else 0 |
//! | delivery | `delivery_fee`, flat |
//! | total | sum of the above, rounded to kobo |
//!
//! VAT is a flat fee per distinct line, not per unit: ten plates of one
//! recipe pay the same VAT as one plate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::Money;
use crate::types::money::lenient_amount;

/// Subtotal at which the payment processor starts charging its surcharge.
pub const PROCESSOR_FEE_THRESHOLD: Decimal = Decimal::from_parts(2500, 0, 0, false, 0);

/// Percentage part of the processor surcharge (1.5%).
pub const PROCESSOR_FEE_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 3);

/// Flat part of the processor surcharge.
pub const PROCESSOR_FEE_FLAT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Share of VAT still charged once a coupon is applied (20% off).
pub const COUPON_VAT_FACTOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Fees served by `fetch_fee.php`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Flat VAT charged per line item.
    #[serde(deserialize_with = "lenient_amount")]
    pub vat_fee: Decimal,
    /// Flat delivery charge per order.
    #[serde(deserialize_with = "lenient_amount")]
    pub delivery_fee: Decimal,
}

/// Every amount shown on the order summary and sent with the payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Money,
    pub vat: Money,
    pub processor_fee: Money,
    pub delivery: Money,
    pub total: Money,
    /// Whether the VAT figure includes the coupon discount.
    pub coupon_applied: bool,
}

impl Totals {
    /// The total as the fixed-point string the payment endpoint expects.
    #[must_use]
    pub fn total_fixed(&self) -> String {
        self.total.to_fixed()
    }

    /// Whether the processor surcharge applies (shown as its own summary row).
    #[must_use]
    pub fn has_processor_fee(&self) -> bool {
        self.processor_fee != Money::ZERO
    }
}

/// Compute checkout totals.
///
/// The component fields are exact; `total` is the exact sum rounded to two
/// decimal places. An empty cart yields a total equal to the delivery fee;
/// callers must not offer checkout for an empty cart. Amounts too large for
/// a `Decimal` saturate at [`Decimal::MAX`].
///
/// ```
/// use cravii_core::{CartItem, FeeSchedule, RecipeId, RestaurantId, recompute_totals};
/// use rust_decimal::Decimal;
///
/// let cart = vec![CartItem {
///     id: RecipeId::new(1),
///     name: "Jollof".into(),
///     price: "1000".into(),
///     image_url: None,
///     restaurant_id: RestaurantId::new(1),
///     quantity: 2,
/// }];
/// let fee = FeeSchedule { vat_fee: Decimal::from(100), delivery_fee: Decimal::from(500) };
///
/// assert_eq!(recompute_totals(&cart, &fee, false).total_fixed(), "2600.00");
/// assert_eq!(recompute_totals(&cart, &fee, true).total_fixed(), "2580.00");
/// ```
#[must_use]
pub fn recompute_totals(items: &[CartItem], fee: &FeeSchedule, coupon_applied: bool) -> Totals {
    let subtotal: Money = items.iter().map(CartItem::line_total).sum();

    let line_count = Decimal::from(items.len());
    let mut vat = Money::new(fee.vat_fee) * line_count;
    if coupon_applied {
        vat = vat * COUPON_VAT_FACTOR;
    }

    let processor_fee = processor_fee(subtotal);
    let delivery = Money::new(fee.delivery_fee);
    let total = (subtotal + vat + processor_fee + delivery).round_minor();

    Totals {
        subtotal,
        vat,
        processor_fee,
        delivery,
        total,
        coupon_applied,
    }
}

/// Payment processor surcharge for a given subtotal.
#[must_use]
pub fn processor_fee(subtotal: Money) -> Money {
    if subtotal.amount() >= PROCESSOR_FEE_THRESHOLD {
        subtotal * PROCESSOR_FEE_RATE + Money::new(PROCESSOR_FEE_FLAT)
    } else {
        Money::ZERO
    }
}
