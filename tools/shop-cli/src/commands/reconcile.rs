//! Drop products the catalog no longer carries.

use anyhow::{bail, Result};
use serde_json::json;

use crate::context::Context;

/// Run the reconcile command.
pub async fn run(ctx: &Context) -> Result<()> {
    if ctx.offline {
        bail!("Cannot check the cart against the catalog with --offline");
    }

    let (mut store, notifier) = ctx.open_store()?;
    let before = store.items().len();

    ctx.reconcile(&mut store, ctx.lookup()?).await;
    let removed = before - store.items().len();

    let notifications = ctx.report(&notifier);
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "removed": removed,
            "cart": store.cart(),
            "notifications": notifications,
        }));
    } else if removed == 0 {
        ctx.output.success("All products in your cart are still available");
    }

    Ok(())
}
