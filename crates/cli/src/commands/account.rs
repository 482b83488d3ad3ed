//! Login, registration and session commands.

use qkart_storefront::auth;
use qkart_storefront::error::StorefrontError;

use super::{CommandError, Context};
use crate::output;

/// Log in and persist the session.
pub async fn login(ctx: &Context, username: &str, password: &str) -> Result<(), CommandError> {
    let client = ctx.client()?;
    let session = auth::login(&client, ctx.store(), ctx.notifier(), username, password).await;
    ctx.flush();
    if let Some(session) = session {
        output::whoami(&session);
    }
    Ok(())
}

/// Create an account.
pub async fn register(
    ctx: &Context,
    username: &str,
    password: &str,
    confirm: &str,
) -> Result<(), CommandError> {
    let client = ctx.client()?;
    let registered = auth::register(&client, ctx.notifier(), username, password, confirm).await;
    ctx.flush();
    if registered {
        tracing::info!(username, "Account created, log in with `qkart login`");
    }
    Ok(())
}

/// Forget the stored session.
pub fn logout(ctx: &Context) -> Result<(), CommandError> {
    auth::logout(ctx.store()).map_err(StorefrontError::from)?;
    output::line("Logged out");
    Ok(())
}

/// Print the stored session.
pub fn whoami(ctx: &Context) -> Result<(), CommandError> {
    output::whoami(&ctx.session()?);
    Ok(())
}
