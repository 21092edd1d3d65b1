//! Manual redirect-chain walk shared by every hop-based strategy.
//!
//! Redirects are never followed automatically: each strategy supplies a
//! [`HopTransport`] that issues exactly one request, and this module decides
//! whether to follow, stop, or classify.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use thiserror::Error;

use super::classify::{classify, is_redirect_status, FailureKind, TransportOutcome};
use super::model::{ResolutionRequest, ResolutionResult};
use super::status::ResolutionStatus;
use super::url::resolve_location;
use crate::security::validate_url_safe;

/// What a single non-following request observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HopResponse {
    pub status: u16,
    /// Raw `Location` header value, if the response carried one.
    pub location: Option<String>,
    /// Block signature spotted in a terminal 2xx body, if the transport looks.
    pub block_signature: Option<String>,
}

impl HopResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A hop that did not yield an interpretable status line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HopFailure {
    /// Nothing came back: timeout, DNS, refused, TLS, and so on. `detail` is
    /// for logs only; classification uses `kind`.
    #[error("{detail}")]
    NoResponse { kind: FailureKind, detail: String },
    /// Something came back but could not be parsed.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl HopFailure {
    pub fn no_response(kind: FailureKind, detail: impl Into<String>) -> Self {
        HopFailure::NoResponse {
            kind,
            detail: detail.into(),
        }
    }

    fn as_outcome(&self) -> TransportOutcome {
        match self {
            HopFailure::NoResponse { kind, .. } => TransportOutcome::NoResponse { kind: *kind },
            HopFailure::Malformed(_) => TransportOutcome::Malformed,
        }
    }
}

/// One request, no redirect following.
#[async_trait]
pub trait HopTransport: Send + Sync {
    async fn fetch_hop(&self, url: &str, timeout: Duration) -> Result<HopResponse, HopFailure>;
}

/// Per-walk switches that do not belong on the request itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Refuse hops to localhost, private, loopback and link-local targets.
    pub deny_private_targets: bool,
}

/// Walks the redirect chain starting at the request's seed URL.
///
/// Never fails: transport problems come back as classified results.
pub async fn follow_redirects<T>(
    transport: &T,
    request: &ResolutionRequest,
    strategy_name: &str,
    options: WalkOptions,
) -> ResolutionResult
where
    T: HopTransport + ?Sized,
{
    let started = Instant::now();
    let max_redirects = request.max_redirects();
    let mut current_url = request.seed_url().to_string();
    let mut redirect_count = 0usize;

    while redirect_count <= max_redirects {
        if options.deny_private_targets {
            if let Err(e) = validate_url_safe(&current_url) {
                warn!("[{strategy_name}] Refusing hop: {e}");
                return ResolutionResult::new(
                    request,
                    current_url,
                    redirect_count,
                    ResolutionStatus::Error,
                    strategy_name,
                    started,
                );
            }
        }

        let response = match transport.fetch_hop(&current_url, request.timeout()).await {
            Ok(response) => response,
            Err(failure) => {
                let status = classify(&failure.as_outcome());
                debug!("[{strategy_name}] {current_url} failed ({status}): {failure}");
                return ResolutionResult::new(
                    request,
                    current_url,
                    redirect_count,
                    status,
                    strategy_name,
                    started,
                );
            }
        };

        debug!(
            "[{strategy_name}] hop {redirect_count}: {current_url} -> {}",
            response.status
        );

        if is_redirect_status(response.status) {
            match response.location.as_deref().map(str::trim) {
                Some(location) if !location.is_empty() => {
                    current_url = resolve_location(&current_url, location);
                    redirect_count += 1;
                    continue;
                }
                _ => {
                    warn!(
                        "[{strategy_name}] Redirect status {} for {current_url} but no Location header",
                        response.status
                    );
                    return ResolutionResult::new(
                        request,
                        current_url,
                        redirect_count,
                        ResolutionStatus::Success,
                        strategy_name,
                        started,
                    );
                }
            }
        }

        if let Some(signature) = response.block_signature.as_deref() {
            debug!("[{strategy_name}] block signature '{signature}' at {current_url}");
        }
        let status = classify(&TransportOutcome::Response {
            status: response.status,
            block_signature: response.block_signature.is_some(),
        });
        return ResolutionResult::new(
            request,
            current_url,
            redirect_count,
            status,
            strategy_name,
            started,
        );
    }

    ResolutionResult::new(
        request,
        current_url,
        max_redirects,
        ResolutionStatus::MaxRedirectsExceeded,
        strategy_name,
        started,
    )
}
