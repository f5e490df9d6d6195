//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, MAX_REDIRECT_HOPS};

/// Initializes the HTTP client shared by landing and script collection.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the config
/// - Timeout from the config
/// - Redirect following, capped at `MAX_REDIRECT_HOPS`
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECT_HOPS))
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
