//! Catalog commands.

use std::time::Duration;

use qkart_storefront::search::{ProductListing, SearchDebouncer};
use qkart_storefront::session::Session;

use super::{CommandError, Context};
use crate::output;

/// Print the full catalog.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let Some(view) = ctx.mounted_view(Session::anonymous()).await? else {
        return Ok(());
    };
    if let Some(catalog) = view.catalog() {
        output::products(catalog.products());
    }
    Ok(())
}

/// Run one search and print what the product grid would show.
pub async fn search(ctx: &Context, text: &str) -> Result<(), CommandError> {
    let Some(view) = ctx.mounted_view(Session::anonymous()).await? else {
        return Ok(());
    };
    let Some(catalog) = view.catalog().cloned() else {
        return Ok(());
    };

    let mut listing = ProductListing::new(catalog, ctx.notifier().clone());
    // A single query has nothing to debounce
    let (mut debouncer, mut outcomes) = SearchDebouncer::new(ctx.client()?, Duration::ZERO);
    let generation = debouncer.input(text);
    if let Some(outcome) = outcomes.recv().await {
        listing.apply(outcome, generation);
    }

    ctx.flush();
    output::products(listing.displayed());
    Ok(())
}
