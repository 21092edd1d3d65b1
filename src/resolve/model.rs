//! Request and result types passed between the batch driver, the
//! orchestrator, and the strategies.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::status::ResolutionStatus;

/// Name recorded in `strategy_used` when no strategy produced the result.
pub const NO_STRATEGY: &str = "none";

/// Correlation data from the source row. Never interpreted, only echoed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowContext {
    pub id: Option<String>,
    pub model: Option<String>,
}

/// One URL to resolve. Immutable once built.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    seed_url: String,
    max_redirects: usize,
    timeout: Duration,
    row_context: Option<RowContext>,
}

impl ResolutionRequest {
    pub fn new(seed_url: impl Into<String>, max_redirects: usize, timeout: Duration) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_redirects,
            timeout,
            row_context: None,
        }
    }

    pub fn with_row_context(mut self, row_context: RowContext) -> Self {
        self.row_context = Some(row_context);
        self
    }

    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Bound on a single hop, not on the whole chain.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn row_context(&self) -> Option<&RowContext> {
        self.row_context.as_ref()
    }
}

/// Fully classified outcome of resolving one `ResolutionRequest`.
///
/// Built only through the constructors below, which enforce that
/// `final_url` is never empty and `redirect_count` never exceeds the
/// request's `max_redirects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub status: ResolutionStatus,
    pub strategy_used: String,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_context: Option<RowContext>,
}

impl ResolutionResult {
    /// Builds a result for `request`, clamping the count and defaulting an
    /// empty final URL to the seed.
    pub fn new(
        request: &ResolutionRequest,
        final_url: impl Into<String>,
        redirect_count: usize,
        status: ResolutionStatus,
        strategy_used: &str,
        started: Instant,
    ) -> Self {
        let final_url = final_url.into();
        let final_url = if final_url.trim().is_empty() {
            request.seed_url().to_string()
        } else {
            final_url
        };
        Self {
            original_url: request.seed_url().to_string(),
            final_url,
            redirect_count: redirect_count.min(request.max_redirects()),
            status,
            strategy_used: strategy_used.to_string(),
            elapsed_ms: elapsed_ms_since(started),
            row_context: request.row_context().cloned(),
        }
    }

    /// A result that never advanced past the seed URL.
    pub fn unresolved(
        request: &ResolutionRequest,
        status: ResolutionStatus,
        strategy_used: &str,
        started: Instant,
    ) -> Self {
        Self::new(request, request.seed_url(), 0, status, strategy_used, started)
    }
}

pub(crate) fn elapsed_ms_since(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
