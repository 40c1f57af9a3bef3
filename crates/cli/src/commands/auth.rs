//! Sign-in, registration and sign-out.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from STOCKPILE_PASSWORD or --password)
//! stockpile login -e me@example.com
//!
//! # Create an account
//! stockpile register -n "Sam" -e me@example.com
//!
//! # Forget the stored session
//! stockpile logout
//! ```

use stockpile_core::{LoginRequest, RegisterRequest};
use tracing::info;

use super::{CommandError, Context};

/// Sign in and store the issued tokens.
pub async fn login(email: &str, password: &str) -> Result<(), CommandError> {
    let request = LoginRequest::new(email, password)?;
    let context = Context::from_env()?;

    context.api.login(request).await?;

    info!(email, "Signed in");
    Ok(())
}

/// Create an account and sign in with it.
pub async fn register(name: &str, email: &str, password: &str) -> Result<(), CommandError> {
    let request = RegisterRequest::new(name, email, password)?;
    let context = Context::from_env()?;

    context.api.register(request).await?;

    info!(email, "Account created and signed in");
    Ok(())
}

/// Sign out remotely when possible and always locally.
pub async fn logout() -> Result<(), CommandError> {
    let context = Context::from_env()?;
    if !context.session.is_authenticated() {
        info!("Already signed out");
        return Ok(());
    }

    context.store.sign_out().await;

    info!("Signed out");
    Ok(())
}

/// Report whether credentials are stored, and the active group.
pub fn status() -> Result<(), CommandError> {
    let context = Context::from_env()?;
    let session = context.session.load()?;
    let state = context.store.snapshot();

    info!(
        signed_in = session.access_token.is_some(),
        can_refresh = session.refresh_token.is_some(),
        device_id = session.device_id.as_deref().unwrap_or("-"),
        active_group = state.active_group_id.as_ref().map_or("-", |id| id.as_str()),
        "Session status"
    );
    Ok(())
}
