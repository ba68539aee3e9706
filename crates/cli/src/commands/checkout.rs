//! Checkout commands.

use cravii_client::ClientContext;
use cravii_client::checkout::{CheckoutError, CheckoutSession};
use cravii_core::{PaymentRedirect, Totals};

use super::{CommandError, prompt_line};

/// Arguments of `checkout pay`.
#[derive(Debug)]
pub struct PayArgs {
    pub address: Option<String>,
    pub phone: String,
    pub location: String,
    pub coupon: Option<String>,
}

fn print_totals(totals: &Totals) {
    println!("Subtotal:       {:>12}", totals.subtotal.round_minor().to_string());
    let vat_label = if totals.coupon_applied {
        "VAT (-20%):"
    } else {
        "VAT:"
    };
    println!("{vat_label:<15} {:>12}", totals.vat.round_minor().to_string());
    if totals.has_processor_fee() {
        println!(
            "Payment fee:    {:>12}",
            totals.processor_fee.round_minor().to_string()
        );
    }
    println!("Delivery:       {:>12}", totals.delivery.round_minor().to_string());
    println!("Total:          {:>12}", totals.total.to_string());
}

/// Load a session, logging the relogin hint when needed.
async fn start(ctx: &ClientContext) -> Result<CheckoutSession, CommandError> {
    let mut checkout = ctx.checkout();
    match checkout.load().await {
        Ok(()) => Ok(checkout),
        Err(e @ (CheckoutError::NotLoggedIn | CheckoutError::SessionExpired)) => {
            checkout.acknowledge_relogin().await?;
            println!("Please log in again with `cravii login <email>`. Your cart has been kept.");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Apply a coupon, reporting a refusal without aborting.
async fn apply_coupon(checkout: &mut CheckoutSession, code: &str) -> Result<(), CommandError> {
    match checkout.apply_coupon(code).await {
        Ok(()) => {
            println!("Coupon applied! 20% off VAT.");
            Ok(())
        }
        Err(CheckoutError::CouponRejected(reason)) => {
            println!("Coupon not applied: {reason}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Print what the cart would cost.
pub async fn quote(ctx: &ClientContext, coupon: Option<&str>) -> Result<(), CommandError> {
    let mut checkout = start(ctx).await?;
    if checkout.items().is_empty() {
        println!("Your cart is empty");
        return Ok(());
    }
    if let Some(code) = coupon {
        apply_coupon(&mut checkout, code).await?;
    }
    if let Some(totals) = checkout.totals() {
        print_totals(&totals);
    }
    Ok(())
}

/// Pay for the cart.
///
/// The payment page is opened by the customer in a browser; the URL it ends
/// on is pasted back here to finish the order.
pub async fn pay(ctx: &ClientContext, args: PayArgs) -> Result<(), CommandError> {
    let mut checkout = start(ctx).await?;
    {
        let delivery = checkout.delivery_mut();
        if let Some(address) = args.address {
            delivery.address = address;
        }
        delivery.phone_number = args.phone;
        delivery.location = args.location;
    }
    if let Some(code) = args.coupon.as_deref() {
        apply_coupon(&mut checkout, code).await?;
    }
    if let Some(totals) = checkout.totals() {
        print_totals(&totals);
    }

    let url = match checkout.submit().await {
        Ok(url) => url,
        Err(CheckoutError::SessionExpired) => {
            checkout.acknowledge_relogin().await?;
            println!("Please log in again with `cravii login <email>`. Your cart has been kept.");
            return Err(CheckoutError::SessionExpired.into());
        }
        Err(CheckoutError::RestaurantMismatch) => {
            println!("Items must be from one restaurant. Review them with `cravii cart list`.");
            return Err(CheckoutError::RestaurantMismatch.into());
        }
        Err(e) => return Err(e.into()),
    };

    println!("\nOpen this page to pay:\n  {url}\n");
    loop {
        let Some(line) = prompt_line("Paste the address the payment page ends on: ")? else {
            checkout.close_payment()?;
            println!("Payment page closed. Your cart has been kept.");
            return Ok(());
        };

        match checkout.on_navigation(&line).await? {
            PaymentRedirect::Success => {
                if let Some(task) = checkout.take_email_task() {
                    // Best effort; failures are logged by the task itself
                    let _ = task.await;
                }
                println!("Payment successful! Your order is on its way.");
                return Ok(());
            }
            PaymentRedirect::Cancelled => {
                println!("Payment cancelled. Your cart has been kept.");
                return Ok(());
            }
            PaymentRedirect::InProgress => {}
        }
    }
}
