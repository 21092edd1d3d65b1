//! HTTP client initialization.

use std::sync::Arc;

use crate::config::{Config, DEFAULT_USER_AGENT};
use crate::strategy::redirectless_client_builder;

/// Initializes the shared client used by the plain strategy.
///
/// Redirects are disabled so every hop can be inspected. No client-level
/// timeout is set: each hop carries its own, from the request.
pub fn init_redirect_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = redirectless_client_builder()
        .user_agent(DEFAULT_USER_AGENT)
        .connect_timeout(config.timeout())
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_redirect_client() {
        let client = init_redirect_client(&Config::default());
        assert!(client.is_ok());
    }
}
