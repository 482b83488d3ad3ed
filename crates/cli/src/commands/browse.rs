//! Interactive catalog.
//!
//! Each stdin line is the current content of the search box. Searches go
//! out after the configured quiet period; typing again before it elapses
//! restarts the timer.

use qkart_storefront::search::{ProductListing, SearchDebouncer};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CommandError, Context};
use crate::output;

pub async fn run(ctx: &Context) -> Result<(), CommandError> {
    let Some(view) = ctx.mounted_view(ctx.session()?).await? else {
        return Ok(());
    };
    let Some(catalog) = view.catalog().cloned() else {
        return Ok(());
    };

    let mut listing = ProductListing::new(catalog, ctx.notifier().clone());
    output::products(listing.displayed());

    let (mut debouncer, mut outcomes) =
        SearchDebouncer::new(ctx.client()?, ctx.config().search_debounce);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    let mut awaiting = false;

    // Keep going after end of input until the last search has reported
    while input_open || awaiting {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line? {
                    Some(text) => {
                        debouncer.input(text.trim());
                        awaiting = true;
                    }
                    None => input_open = false,
                }
            }
            Some(outcome) = outcomes.recv(), if awaiting => {
                let latest = debouncer.latest_generation();
                awaiting = outcome.generation < latest;
                if listing.apply(outcome, latest) {
                    output::products(listing.displayed());
                }
                ctx.flush();
            }
            else => break,
        }
    }
    Ok(())
}
