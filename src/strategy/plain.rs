//! Plain HTTP strategy: one shared client, fixed browser headers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::headers::RequestHeaders;
use super::transport::send_hop;
use super::{RedirectStrategy, PLAIN_HTTP_STRATEGY};
use crate::resolve::{
    follow_redirects, HopFailure, HopResponse, HopTransport, ResolutionRequest, ResolutionResult,
    WalkOptions,
};

pub struct PlainHttpStrategy {
    client: Arc<reqwest::Client>,
    options: WalkOptions,
}

impl PlainHttpStrategy {
    /// `client` must have automatic redirects disabled.
    pub fn new(client: Arc<reqwest::Client>, options: WalkOptions) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl HopTransport for PlainHttpStrategy {
    async fn fetch_hop(&self, url: &str, timeout: Duration) -> Result<HopResponse, HopFailure> {
        send_hop(
            RequestHeaders::apply_to_request_builder(self.client.get(url)),
            timeout,
        )
        .await
    }
}

#[async_trait]
impl RedirectStrategy for PlainHttpStrategy {
    fn name(&self) -> &'static str {
        PLAIN_HTTP_STRATEGY
    }

    fn priority(&self) -> u32 {
        10
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        follow_redirects(self, request, PLAIN_HTTP_STRATEGY, self.options).await
    }
}
