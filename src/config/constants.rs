//! Configuration constants.
//!
//! Defaults and operational limits used throughout the resolver.

use std::time::Duration;

// Defaults (overridable from the CLI)
/// Maximum redirects followed per resolution
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
/// Per-hop timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Maximum concurrent resolutions (semaphore limit)
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
/// Pause between two strategy attempts on the same URL
pub const DEFAULT_STRATEGY_PAUSE_MS: u64 = 200;
pub const DEFAULT_STRATEGY_PAUSE: Duration = Duration::from_millis(DEFAULT_STRATEGY_PAUSE_MS);
/// Browser URL polling schedule, in seconds
pub const DEFAULT_BROWSER_POLL_SECS: [u64; 3] = [2, 3, 5];
pub const DEFAULT_CURL_BINARY: &str = "curl";

/// Number of completed URLs between progress log lines
pub const LOGGING_INTERVAL: usize = 5;

/// Maximum URL length (2048 characters), matching common browser and server limits.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum bytes of a terminal 2xx body inspected for block signatures (64KB)
pub const MAX_BLOCK_SCAN_BYTES: usize = 64 * 1024;

// Curl
/// Extra time the curl process gets on top of its own `--max-time`
pub const CURL_PROCESS_GRACE: Duration = Duration::from_secs(5);
/// Timeout for the `curl --version` availability probe
pub const CURL_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Marker prefixing the `--write-out` line
pub const CURL_INFO_MARKER: &str = "CURL_INFO:";

// Proxy health check
pub const PROXY_HEALTH_CHECK_URL: &str = "http://httpbin.org/ip";
pub const PROXY_HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Default User-Agent for the plain HTTP strategy and the curl strategy.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Rotation pool for the enhanced HTTP strategy.
pub const DEFAULT_USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
];
