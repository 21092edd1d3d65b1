//! Headless browser strategy.
//!
//! Catches what no hop-based strategy can: JavaScript and meta-refresh
//! redirects. Compiled only with the `browser` feature; without it the
//! strategy reports itself unavailable.

use std::time::Duration;

use async_trait::async_trait;

use super::{RedirectStrategy, BROWSER_STRATEGY};
use crate::resolve::{ResolutionRequest, ResolutionResult, WalkOptions};

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub struct BrowserStrategy {
    poll_schedule: Vec<Duration>,
    user_agent: String,
    options: WalkOptions,
    #[cfg(feature = "browser")]
    available: tokio::sync::OnceCell<bool>,
}

impl BrowserStrategy {
    pub fn new(poll_secs: &[u64], user_agent: impl Into<String>, options: WalkOptions) -> Self {
        Self {
            poll_schedule: poll_secs.iter().map(|s| Duration::from_secs(*s)).collect(),
            user_agent: user_agent.into(),
            options,
            #[cfg(feature = "browser")]
            available: tokio::sync::OnceCell::new(),
        }
    }
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
/// Counts URL changes in an observed sequence, ignoring repeats.
pub(crate) fn count_url_changes<'a>(observed: impl IntoIterator<Item = &'a str>) -> usize {
    let mut changes = 0;
    let mut last: Option<&str> = None;
    for url in observed {
        if let Some(previous) = last {
            if previous != url {
                changes += 1;
            }
        }
        last = Some(url);
    }
    changes
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
/// Title-level block markers, on top of the shared body signatures.
pub(crate) fn title_looks_blocked(title: &str) -> bool {
    let lower = title.to_lowercase();
    ["403", "forbidden", "access denied"]
        .iter()
        .any(|marker| lower.contains(marker))
}

#[cfg(feature = "browser")]
mod headless {
    use std::time::Instant;

    use chromiumoxide::browser::{Browser, BrowserConfig};
    use futures::StreamExt;
    use log::{debug, warn};

    use super::{count_url_changes, title_looks_blocked, BrowserStrategy};
    use crate::resolve::{
        detect_block_signature, FailureKind, ResolutionRequest, ResolutionResult,
        ResolutionStatus,
    };
    use crate::security::validate_url_safe;
    use crate::strategy::BROWSER_STRATEGY;

    const BROWSER_ARGS: [&str; 6] = [
        "--disable-blink-features=AutomationControlled",
        "--disable-infobars",
        "--disable-dev-shm-usage",
        "--disable-gpu",
        "--no-sandbox",
        "--no-first-run",
    ];

    fn browser_config(user_agent: &str) -> Result<BrowserConfig, String> {
        BrowserConfig::builder()
            .args(BROWSER_ARGS)
            .arg(format!("--user-agent={user_agent}"))
            .build()
    }

    /// A Chrome executable can be located.
    pub(super) fn probe_chrome(user_agent: &str) -> bool {
        match browser_config(user_agent) {
            Ok(_) => true,
            Err(e) => {
                debug!("Browser strategy unavailable: {e}");
                false
            }
        }
    }

    impl BrowserStrategy {
        pub(super) async fn resolve_headless(&self, request: &ResolutionRequest) -> ResolutionResult {
            let started = Instant::now();
            let fail = |status: ResolutionStatus, final_url: &str, count: usize| {
                ResolutionResult::new(request, final_url, count, status, BROWSER_STRATEGY, started)
            };

            if self.options.deny_private_targets {
                if let Err(e) = validate_url_safe(request.seed_url()) {
                    warn!("[{BROWSER_STRATEGY}] Refusing navigation: {e}");
                    return fail(ResolutionStatus::Error, request.seed_url(), 0);
                }
            }

            let config = match browser_config(&self.user_agent) {
                Ok(config) => config,
                Err(e) => {
                    warn!("[{BROWSER_STRATEGY}] Browser config error: {e}");
                    return fail(ResolutionStatus::Error, request.seed_url(), 0);
                }
            };
            let (mut browser, mut handler) = match Browser::launch(config).await {
                Ok(launched) => launched,
                Err(e) => {
                    warn!("[{BROWSER_STRATEGY}] Failed to launch browser: {e}");
                    return fail(ResolutionStatus::Error, request.seed_url(), 0);
                }
            };
            let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });

            let result = self.navigate(&browser, request, started).await;

            if let Err(e) = browser.close().await {
                debug!("[{BROWSER_STRATEGY}] Browser close error: {e}");
            }
            handle.abort();
            result
        }

        async fn navigate(
            &self,
            browser: &Browser,
            request: &ResolutionRequest,
            started: Instant,
        ) -> ResolutionResult {
            let seed = request.seed_url();
            let result = |url: &str, count: usize, status: ResolutionStatus| {
                ResolutionResult::new(request, url, count, status, BROWSER_STRATEGY, started)
            };

            let page = match browser.new_page("about:blank").await {
                Ok(page) => page,
                Err(e) => {
                    warn!("[{BROWSER_STRATEGY}] Failed to create page: {e}");
                    return result(seed, 0, ResolutionStatus::Error);
                }
            };

            match tokio::time::timeout(request.timeout(), page.goto(seed)).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    let message = e.to_string();
                    debug!("[{BROWSER_STRATEGY}] Navigation to {seed} failed: {message}");
                    return result(seed, 0, FailureKind::from_net_error(&message).status());
                }
                Err(_) => {
                    return result(seed, 0, ResolutionStatus::Timeout);
                }
            }

            // Chrome reports normalized URLs; compare against the normalized seed
            let normalized_seed = url::Url::parse(seed)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| seed.to_string());
            let mut observed: Vec<String> = vec![normalized_seed];
            if let Ok(Some(url)) = page.url().await {
                observed.push(url);
            }
            for wait in &self.poll_schedule {
                tokio::time::sleep(*wait).await;
                match page.url().await {
                    Ok(Some(url)) => {
                        debug!("[{BROWSER_STRATEGY}] {seed} now at {url}");
                        observed.push(url);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!("[{BROWSER_STRATEGY}] Could not read URL: {e}");
                        break;
                    }
                }
            }

            let final_url = observed
                .last()
                .cloned()
                .unwrap_or_else(|| seed.to_string());
            let changes = count_url_changes(observed.iter().map(String::as_str));
            if changes > request.max_redirects() {
                return result(&final_url, changes, ResolutionStatus::MaxRedirectsExceeded);
            }

            let title = page.get_title().await.ok().flatten().unwrap_or_default();
            let content = page.content().await.unwrap_or_default();
            let blocked = title_looks_blocked(&title)
                || detect_block_signature(&title).is_some()
                || detect_block_signature(&content).is_some();

            let status = if blocked {
                ResolutionStatus::Blocked
            } else {
                ResolutionStatus::Success
            };
            result(&final_url, changes, status)
        }
    }
}

#[async_trait]
impl RedirectStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        BROWSER_STRATEGY
    }

    fn priority(&self) -> u32 {
        50
    }

    #[cfg(feature = "browser")]
    async fn is_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| async { headless::probe_chrome(&self.user_agent) })
            .await
    }

    #[cfg(not(feature = "browser"))]
    async fn is_available(&self) -> bool {
        false
    }

    #[cfg(feature = "browser")]
    async fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        self.resolve_headless(request).await
    }

    #[cfg(not(feature = "browser"))]
    async fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        log::warn!(
            "[{BROWSER_STRATEGY}] Built without the browser feature; cannot resolve {}",
            request.seed_url()
        );
        ResolutionResult::unresolved(
            request,
            crate::resolve::ResolutionStatus::Error,
            BROWSER_STRATEGY,
            std::time::Instant::now(),
        )
    }
}
