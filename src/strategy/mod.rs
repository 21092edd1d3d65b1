//! Redirect resolution strategies.
//!
//! Each strategy is one self-contained technique for walking a redirect
//! chain. The orchestrator only sees the [`RedirectStrategy`] trait:
//!
//! | name            | priority | technique                                   |
//! |-----------------|----------|---------------------------------------------|
//! | `plain-http`    | 10       | shared client, fixed browser headers        |
//! | `enhanced-http` | 20       | per-resolution cookie jar, rotated identity |
//! | `curl`          | 30       | one `curl` subprocess per hop               |
//! | `proxy-http`    | 40       | round-robin proxy pool                      |
//! | `browser`       | 50       | headless Chrome (`browser` feature)         |

mod browser;
mod curl;
mod enhanced;
mod headers;
mod plain;
mod proxy;
mod rotation;
mod transport;

use async_trait::async_trait;

use crate::resolve::{ResolutionRequest, ResolutionResult};

pub use browser::BrowserStrategy;
pub use curl::{parse_curl_output, CurlStrategy};
pub use enhanced::EnhancedHttpStrategy;
pub use plain::PlainHttpStrategy;
pub use proxy::{parse_proxies, ProxyEndpoint, ProxyHealth, ProxyHttpStrategy, ProxyScheme};
pub use rotation::{RoundRobin, UserAgentPool};
pub(crate) use transport::redirectless_client_builder;

pub const PLAIN_HTTP_STRATEGY: &str = "plain-http";
pub const ENHANCED_HTTP_STRATEGY: &str = "enhanced-http";
pub const CURL_STRATEGY: &str = "curl";
pub const PROXY_HTTP_STRATEGY: &str = "proxy-http";
pub const BROWSER_STRATEGY: &str = "browser";

/// Every strategy name, in default priority order.
pub const STRATEGY_NAMES: [&str; 5] = [
    PLAIN_HTTP_STRATEGY,
    ENHANCED_HTTP_STRATEGY,
    CURL_STRATEGY,
    PROXY_HTTP_STRATEGY,
    BROWSER_STRATEGY,
];

/// One technique for resolving a URL's final destination.
///
/// Implementations must never fail: every internal error is converted into
/// a classified `ResolutionResult`.
#[async_trait]
pub trait RedirectStrategy: Send + Sync {
    /// Stable identifier, recorded in `ResolutionResult::strategy_used`.
    fn name(&self) -> &'static str;

    /// Lower runs first.
    fn priority(&self) -> u32;

    /// Whether the strategy can run in this environment. May probe lazily;
    /// expensive probes are cached for the life of the process.
    async fn is_available(&self) -> bool;

    async fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult;
}
