//! Pre-order stock check.

use anyhow::{bail, Result};
use chrono::Utc;
use serde_json::json;
use shop_client::revalidate_for_checkout;

use crate::context::Context;

/// Run the checkout command.
pub async fn run(ctx: &Context) -> Result<()> {
    let (mut store, notifier) = ctx.mount().await?;

    if store.items().is_empty() {
        ctx.report(&notifier);
        bail!("Your cart is empty");
    }

    let lookup = ctx.lookup()?;
    let spinner = ctx.output.spinner("Checking stock...");
    let review = revalidate_for_checkout(&mut store, &lookup).await;
    spinner.finish_and_clear();

    let notifications = ctx.report(&notifier);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "ready": review.is_ready(),
            "checked_at": Utc::now().to_rfc3339(),
            "issues": review.issues,
            "cart": store.cart(),
            "notifications": notifications,
        }));
    } else {
        ctx.output.header("Checkout");
        ctx.output.cart(store.cart());
    }

    if !review.is_ready() {
        bail!(
            "Cart is not ready for checkout ({} issue(s))",
            review.issues.len()
        );
    }

    ctx.output.success("Cart is ready for checkout");
    Ok(())
}
