//! Enhanced HTTP strategy.
//!
//! Looks more like a returning visitor than the plain strategy: a fresh
//! cookie jar per resolution (so cookies set by one hop are replayed on the
//! next), a User-Agent rotated from the configured pool, a random search
//! engine Referer, and client hints when the agent is Chrome.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use super::headers::BrowserIdentity;
use super::rotation::{pick_random, UserAgentPool};
use super::transport::{redirectless_client_builder, send_hop};
use super::{RedirectStrategy, ENHANCED_HTTP_STRATEGY};
use crate::config::{DEFAULT_REFERER, DEFAULT_USER_AGENT, REFERER_POOL};
use crate::resolve::{
    follow_redirects, HopFailure, HopResponse, HopTransport, ResolutionRequest, ResolutionResult,
    ResolutionStatus, WalkOptions,
};

pub struct EnhancedHttpStrategy {
    user_agents: UserAgentPool,
    options: WalkOptions,
}

impl EnhancedHttpStrategy {
    pub fn new(user_agents: &[String], options: WalkOptions) -> Self {
        Self {
            user_agents: UserAgentPool::new(user_agents, DEFAULT_USER_AGENT),
            options,
        }
    }

    fn next_identity(&self) -> BrowserIdentity {
        BrowserIdentity {
            user_agent: self.user_agents.pick().to_string(),
            referer: pick_random(REFERER_POOL)
                .unwrap_or(DEFAULT_REFERER)
                .to_string(),
        }
    }
}

/// One resolution's client and identity; dropped (with its cookies) afterwards.
struct Session {
    client: reqwest::Client,
    identity: BrowserIdentity,
}

#[async_trait]
impl HopTransport for Session {
    async fn fetch_hop(&self, url: &str, timeout: Duration) -> Result<HopResponse, HopFailure> {
        send_hop(
            self.identity.apply_to_request_builder(self.client.get(url)),
            timeout,
        )
        .await
    }
}

#[async_trait]
impl RedirectStrategy for EnhancedHttpStrategy {
    fn name(&self) -> &'static str {
        ENHANCED_HTTP_STRATEGY
    }

    fn priority(&self) -> u32 {
        20
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        let started = std::time::Instant::now();
        let identity = self.next_identity();
        debug!(
            "[{ENHANCED_HTTP_STRATEGY}] {} as '{}' from {}",
            request.seed_url(),
            identity.user_agent,
            identity.referer
        );

        let client = match redirectless_client_builder().cookie_store(true).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("[{ENHANCED_HTTP_STRATEGY}] Failed to build session client: {e}");
                return ResolutionResult::unresolved(
                    request,
                    ResolutionStatus::Error,
                    ENHANCED_HTTP_STRATEGY,
                    started,
                );
            }
        };

        let session = Session { client, identity };
        follow_redirects(&session, request, ENHANCED_HTTP_STRATEGY, self.options).await
    }
}
