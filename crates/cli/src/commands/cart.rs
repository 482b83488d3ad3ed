//! Cart commands.
//!
//! Each command mounts a fresh cart view, so the cart shown is always the
//! backend's current one.

use qkart_core::ProductId;

use super::{CommandError, Context};
use crate::output;

/// Print the cart with its total.
pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.require_session()?;
    if let Some(view) = ctx.mounted_view(session).await? {
        output::cart(view.items(), view.total());
    }
    Ok(())
}

/// Add a product with quantity 1.
pub async fn add(ctx: &Context, product_id: &ProductId) -> Result<(), CommandError> {
    let Some(mut view) = ctx.mounted_view(ctx.session()?).await? else {
        return Ok(());
    };
    let added = view.add_to_cart(product_id).await;
    ctx.flush();
    if added {
        output::cart(view.items(), view.total());
    }
    Ok(())
}

/// Set the absolute quantity of a product.
pub async fn set(ctx: &Context, product_id: &ProductId, quantity: i64) -> Result<(), CommandError> {
    let Some(mut view) = ctx.mounted_view(ctx.session()?).await? else {
        return Ok(());
    };
    let changed = view.set_quantity(product_id, quantity).await;
    ctx.flush();
    if changed {
        output::cart(view.items(), view.total());
    }
    Ok(())
}

/// Stepper: `delta > 0` increments, anything else decrements.
pub async fn step(ctx: &Context, product_id: &ProductId, delta: i8) -> Result<(), CommandError> {
    let Some(mut view) = ctx.mounted_view(ctx.session()?).await? else {
        return Ok(());
    };
    let changed = if delta > 0 {
        view.increment(product_id).await
    } else {
        view.decrement(product_id).await
    };
    ctx.flush();
    if changed {
        output::cart(view.items(), view.total());
    }
    Ok(())
}

/// Print the read-only cart with order details and wallet balance.
pub async fn checkout(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.require_session()?;
    if let Some(view) = ctx.mounted_view(session).await? {
        output::cart(view.items(), view.total());
        output::checkout(&view.summary(), view.session().balance());
    }
    Ok(())
}
