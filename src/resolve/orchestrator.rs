//! Prioritized fallback across redirect strategies.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use log::{debug, error, info, warn};

use super::model::{elapsed_ms_since, ResolutionRequest, ResolutionResult, NO_STRATEGY};
use super::status::ResolutionStatus;
use crate::config::DEFAULT_STRATEGY_PAUSE;
use crate::strategy::{RedirectStrategy, BROWSER_STRATEGY};

/// Position of a request within a batch, used to prefix log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressHint {
    pub current: usize,
    pub total: usize,
}

impl std::fmt::Display for ProgressHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}]", self.current, self.total)
    }
}

/// Runs registered strategies in ascending priority order until one succeeds.
///
/// Holds no per-request state, so one instance is shared across every
/// concurrent resolution in a batch.
pub struct Orchestrator {
    strategies: Vec<Arc<dyn RedirectStrategy>>,
    pause: Duration,
    prefer_browser: bool,
}

impl Orchestrator {
    pub fn new(strategies: Vec<Arc<dyn RedirectStrategy>>) -> Self {
        Self {
            strategies,
            pause: DEFAULT_STRATEGY_PAUSE,
            prefer_browser: false,
        }
    }

    /// Pause between two consecutive strategy attempts.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Restricts every resolution to the browser strategy.
    pub fn with_prefer_browser(mut self, prefer_browser: bool) -> Self {
        self.prefer_browser = prefer_browser;
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolves one request. Always returns a result; never panics.
    pub async fn resolve(
        &self,
        request: &ResolutionRequest,
        hint: Option<ProgressHint>,
    ) -> ResolutionResult {
        let started = Instant::now();
        let prefix = hint.map(|h| format!("{h} ")).unwrap_or_default();

        let mut candidates = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            if self.prefer_browser && strategy.name() != BROWSER_STRATEGY {
                continue;
            }
            if strategy.is_available().await {
                candidates.push(Arc::clone(strategy));
            } else {
                debug!("{prefix}Strategy {} unavailable, skipping", strategy.name());
            }
        }

        if candidates.is_empty() {
            warn!("{prefix}No strategies available for {}", request.seed_url());
            return ResolutionResult::unresolved(
                request,
                ResolutionStatus::NoStrategiesAvailable,
                NO_STRATEGY,
                started,
            );
        }

        // sort_by_key is stable: equal priorities keep registration order
        candidates.sort_by_key(|s| s.priority());

        let mut fallback: Option<ResolutionResult> = None;
        let last = candidates.len() - 1;
        for (index, strategy) in candidates.iter().enumerate() {
            let attempt_started = Instant::now();
            let result = run_contained(strategy.as_ref(), request, attempt_started).await;

            info!(
                "{prefix}{} via {}: {} in {}ms ({} redirects) -> {}",
                request.seed_url(),
                strategy.name(),
                result.status,
                elapsed_ms_since(attempt_started),
                result.redirect_count,
                result.final_url
            );

            if result.status.is_success() {
                return finish(result, started);
            }

            if result.status.is_blocked() {
                debug!(
                    "{prefix}{} blocked on {}, falling through",
                    strategy.name(),
                    request.seed_url()
                );
            }
            fallback = Some(result);

            if index < last && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        match fallback {
            Some(result) => finish(result, started),
            None => ResolutionResult::unresolved(
                request,
                ResolutionStatus::AllStrategiesFailed,
                NO_STRATEGY,
                started,
            ),
        }
    }
}

/// Runs one strategy, turning a panic into an `Error` result.
async fn run_contained(
    strategy: &dyn RedirectStrategy,
    request: &ResolutionRequest,
    started: Instant,
) -> ResolutionResult {
    match AssertUnwindSafe(strategy.resolve(request))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(
                "Strategy {} panicked on {}: {message}",
                strategy.name(),
                request.seed_url()
            );
            ResolutionResult::unresolved(request, ResolutionStatus::Error, strategy.name(), started)
        }
    }
}

fn finish(mut result: ResolutionResult, started: Instant) -> ResolutionResult {
    result.elapsed_ms = elapsed_ms_since(started);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedStrategy {
        name: &'static str,
        priority: u32,
        available: bool,
        status: ResolutionStatus,
        calls: AtomicUsize,
        log: Option<Arc<Mutex<Vec<&'static str>>>>,
    }

    impl FixedStrategy {
        fn new(name: &'static str, priority: u32, status: ResolutionStatus) -> Self {
            Self {
                name,
                priority,
                available: true,
                status,
                calls: AtomicUsize::new(0),
                log: None,
            }
        }

        fn unavailable(mut self) -> Self {
            self.available = false;
            self
        }

        fn logging_to(mut self, log: &Arc<Mutex<Vec<&'static str>>>) -> Self {
            self.log = Some(Arc::clone(log));
            self
        }
    }

    #[async_trait]
    impl RedirectStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> u32 {
            self.priority
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(log) = &self.log {
                log.lock().expect("lock").push(self.name);
            }
            ResolutionResult::new(
                request,
                format!("https://final.example/{}", self.name),
                1,
                self.status,
                self.name,
                Instant::now(),
            )
        }
    }

    struct PanickingStrategy {
        resolved: AtomicBool,
    }

    #[async_trait]
    impl RedirectStrategy for PanickingStrategy {
        fn name(&self) -> &'static str {
            "panicky"
        }

        fn priority(&self) -> u32 {
            1
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn resolve(&self, _request: &ResolutionRequest) -> ResolutionResult {
            self.resolved.store(true, Ordering::SeqCst);
            panic!("strategy exploded");
        }
    }

    fn request() -> ResolutionRequest {
        ResolutionRequest::new("https://seed.example/", 5, Duration::from_secs(1))
    }

    fn orchestrator(strategies: Vec<Arc<dyn RedirectStrategy>>) -> Orchestrator {
        Orchestrator::new(strategies).with_pause(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_no_strategies_available() {
        let result = orchestrator(vec![Arc::new(
            FixedStrategy::new("a", 10, ResolutionStatus::Success).unavailable(),
        )])
        .resolve(&request(), None)
        .await;
        assert_eq!(result.status, ResolutionStatus::NoStrategiesAvailable);
        assert_eq!(result.final_url, "https://seed.example/");
        assert_eq!(result.strategy_used, "none");
        assert_eq!(result.redirect_count, 0);
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let result = orchestrator(Vec::new()).resolve(&request(), None).await;
        assert_eq!(result.status, ResolutionStatus::NoStrategiesAvailable);
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let blocked = Arc::new(FixedStrategy::new("a", 10, ResolutionStatus::Blocked));
        let winner = Arc::new(FixedStrategy::new("b", 20, ResolutionStatus::Success));
        let never = Arc::new(FixedStrategy::new("c", 30, ResolutionStatus::Success));
        let result = orchestrator(vec![never.clone(), winner.clone(), blocked.clone()])
            .resolve(&request(), None)
            .await;
        assert_eq!(result.status, ResolutionStatus::Success);
        assert_eq!(result.strategy_used, "b");
        assert_eq!(blocked.calls.load(Ordering::SeqCst), 1);
        assert_eq!(winner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(never.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_last_failure_wins_when_all_fail() {
        let result = orchestrator(vec![
            Arc::new(FixedStrategy::new("a", 10, ResolutionStatus::Blocked)),
            Arc::new(FixedStrategy::new("b", 20, ResolutionStatus::Timeout)),
        ])
        .resolve(&request(), None)
        .await;
        assert_eq!(result.status, ResolutionStatus::Timeout);
        assert_eq!(result.strategy_used, "b");
    }

    #[tokio::test]
    async fn test_equal_priorities_keep_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        orchestrator(vec![
            Arc::new(FixedStrategy::new("first", 10, ResolutionStatus::Error).logging_to(&log)),
            Arc::new(FixedStrategy::new("second", 10, ResolutionStatus::Error).logging_to(&log)),
            Arc::new(FixedStrategy::new("early", 5, ResolutionStatus::Error).logging_to(&log)),
        ])
        .resolve(&request(), None)
        .await;
        assert_eq!(*log.lock().expect("lock"), vec!["early", "first", "second"]);
    }

    #[tokio::test]
    async fn test_unavailable_strategy_is_never_invoked() {
        let skipped = Arc::new(FixedStrategy::new("a", 1, ResolutionStatus::Success).unavailable());
        let used = Arc::new(FixedStrategy::new("b", 2, ResolutionStatus::Success));
        let result = orchestrator(vec![skipped.clone(), used])
            .resolve(&request(), None)
            .await;
        assert_eq!(result.strategy_used, "b");
        assert_eq!(skipped.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panic_becomes_error_and_next_strategy_runs() {
        let panicky = Arc::new(PanickingStrategy {
            resolved: AtomicBool::new(false),
        });
        let result = orchestrator(vec![
            panicky.clone(),
            Arc::new(FixedStrategy::new("b", 20, ResolutionStatus::Success)),
        ])
        .resolve(&request(), Some(ProgressHint { current: 1, total: 1 }))
        .await;
        assert!(panicky.resolved.load(Ordering::SeqCst));
        assert_eq!(result.status, ResolutionStatus::Success);
    }

    #[tokio::test]
    async fn test_panic_alone_is_error_result() {
        let result = orchestrator(vec![Arc::new(PanickingStrategy {
            resolved: AtomicBool::new(false),
        })])
        .resolve(&request(), None)
        .await;
        assert_eq!(result.status, ResolutionStatus::Error);
        assert_eq!(result.strategy_used, "panicky");
        assert_eq!(result.final_url, "https://seed.example/");
    }

    #[tokio::test]
    async fn test_prefer_browser_restricts_candidates() {
        let plain = Arc::new(FixedStrategy::new("plain-http", 10, ResolutionStatus::Success));
        let browser = Arc::new(FixedStrategy::new(BROWSER_STRATEGY, 50, ResolutionStatus::Blocked));
        let result = orchestrator(vec![plain.clone(), browser])
            .with_prefer_browser(true)
            .resolve(&request(), None)
            .await;
        assert_eq!(result.strategy_used, BROWSER_STRATEGY);
        assert_eq!(result.status, ResolutionStatus::Blocked);
        assert_eq!(plain.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prefer_browser_without_browser() {
        let result = orchestrator(vec![Arc::new(FixedStrategy::new(
            "plain-http",
            10,
            ResolutionStatus::Success,
        ))])
        .with_prefer_browser(true)
        .resolve(&request(), None)
        .await;
        assert_eq!(result.status, ResolutionStatus::NoStrategiesAvailable);
    }

    #[tokio::test]
    async fn test_pause_only_between_attempts() {
        let started = Instant::now();
        orchestrator(vec![Arc::new(FixedStrategy::new(
            "a",
            10,
            ResolutionStatus::Error,
        ))])
        .with_pause(Duration::from_millis(500))
        .resolve(&request(), None)
        .await;
        assert!(started.elapsed() < Duration::from_millis(400));

        let started = Instant::now();
        orchestrator(vec![
            Arc::new(FixedStrategy::new("a", 10, ResolutionStatus::Error)),
            Arc::new(FixedStrategy::new("b", 20, ResolutionStatus::Error)),
        ])
        .with_pause(Duration::from_millis(100))
        .resolve(&request(), None)
        .await;
        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
