//! Cart commands: show, add, remove, update, clear.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use serde_json::json;
use shop_client::{add_product_by_id, Notification};
use shop_commerce::ProductId;

use super::{AddArgs, ClearArgs, RemoveArgs, UpdateArgs};
use crate::context::{Context, Store};

/// Show the cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let (store, notifier) = ctx.mount().await?;

    let notifications = ctx.report(&notifier);
    render(&store, notifications, ctx);
    Ok(())
}

/// Add a product by id, using live catalog data.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let lookup = ctx.lookup()?;
    let (mut store, notifier) = ctx.mount().await?;
    let product_id = ProductId::new(args.product_id);

    let result = add_product_by_id(&mut store, &lookup, &product_id, args.quantity).await;

    let notifications = ctx.report(&notifier);
    if ctx.output.is_json() {
        render(&store, notifications, ctx);
    }
    if result.is_err() {
        bail!("Cart unchanged");
    }
    if !ctx.output.is_json() {
        summary(&store, ctx);
    }
    Ok(())
}

/// Remove a product.
pub async fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let (mut store, notifier) = ctx.mount().await?;
    let product_id = ProductId::new(args.product_id);

    if store.remove_from_cart(&product_id) {
        ctx.output.success(&format!("Removed {product_id} from cart"));
    } else {
        ctx.output.warn(&format!("{product_id} is not in your cart"));
    }

    let notifications = ctx.report(&notifier);
    if ctx.output.is_json() {
        render(&store, notifications, ctx);
    } else {
        summary(&store, ctx);
    }
    Ok(())
}

/// Set a product's quantity.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let (mut store, notifier) = ctx.mount().await?;
    let product_id = ProductId::new(args.product_id);

    if store.cart().get(&product_id).is_none() {
        ctx.output.warn(&format!("{product_id} is not in your cart"));
    }
    let result = store.update_quantity(&product_id, args.quantity);

    let notifications = ctx.report(&notifier);
    if ctx.output.is_json() {
        render(&store, notifications, ctx);
    }
    if result.is_err() {
        bail!("Cart unchanged");
    }
    if !ctx.output.is_json() {
        summary(&store, ctx);
    }
    Ok(())
}

/// Empty the cart.
pub async fn clear(args: ClearArgs, ctx: &Context) -> Result<()> {
    let (mut store, notifier) = ctx.mount().await?;

    if store.items().is_empty() {
        ctx.report(&notifier);
        ctx.output.info("Your cart is already empty");
        return Ok(());
    }

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove all {} items from your cart?", store.total_items()))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Clear cancelled");
            return Ok(());
        }
    }

    store.clear_cart();
    ctx.output.success("Cart cleared");

    let notifications = ctx.report(&notifier);
    if ctx.output.is_json() {
        render(&store, notifications, ctx);
    }
    Ok(())
}

fn render(store: &Store, notifications: Vec<Notification>, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "cart": store.cart(),
            "notifications": notifications,
        }));
        return;
    }

    ctx.output.header("Cart");
    ctx.output.cart(store.cart());
}

fn summary(store: &Store, ctx: &Context) {
    ctx.output.kv(
        "Cart",
        &format!(
            "{} items, {}",
            store.total_items(),
            store.total_price().display()
        ),
    );
}
