//! Batch driver.
//!
//! Reads every row, resolves them concurrently through one shared
//! [`Orchestrator`], and streams each result to the sink as it completes.

mod observer;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{info, warn};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::app::print_resolution_statistics;
use crate::config::{Config, PROXY_HEALTH_CHECK_URL};
use crate::error_handling::ResolutionStats;
use crate::initialization::{build_orchestrator, init_semaphore, load_proxies};
use crate::input::{CsvRowSource, InputRow, RowSource};
use crate::output::{open_sink, ResultSink};
use crate::resolve::{
    Orchestrator, ProgressHint, ResolutionRequest, ResolutionResult, ResolutionStatus, WalkOptions,
    NO_STRATEGY,
};
use crate::strategy::{ProxyHealth, ProxyHttpStrategy};

pub use observer::{LoggingObserver, ProgressObserver};

/// Summary of a completed batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Valid rows read from the source
    pub total_rows: usize,
    /// Rows rejected before resolution
    pub skipped: usize,
    /// Results delivered to the sink
    pub resolved: usize,
    pub successful: usize,
    pub failed: usize,
    /// Non-zero per-status counts, in taxonomy order
    pub by_status: Vec<(ResolutionStatus, usize)>,
    /// Cancellation stopped dispatch before every row was resolved
    pub cancelled: bool,
    pub elapsed_seconds: f64,
}

/// Per-batch resolution settings.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub max_concurrency: usize,
    pub max_redirects: usize,
    pub timeout: Duration,
}

impl From<&Config> for BatchOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            max_redirects: config.max_redirects,
            timeout: config.timeout(),
        }
    }
}

/// Resolves every row of `config.file` and writes the results to
/// `config.output` (stdout when unset).
///
/// Ctrl-C stops dispatching new rows; in-flight resolutions still finish
/// and are written.
///
/// # Errors
///
/// Fails on invalid configuration, an unreadable input, or an unwritable
/// output. Individual URL failures are results, not errors.
pub async fn run_batch(config: Config) -> Result<BatchReport> {
    let orchestrator =
        Arc::new(build_orchestrator(&config).context("Failed to initialize strategies")?);
    let batch = CsvRowSource::new(config.file.clone()).read_rows()?;
    let mut sink = open_sink(config.output.as_deref())?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing in-flight URLs");
            signal_cancel.cancel();
        }
    });

    let observer = LoggingObserver::new();
    let outcome = resolve_rows(
        orchestrator,
        batch.rows,
        sink.as_mut(),
        &observer,
        &BatchOptions::from(&config),
        cancel,
    )
    .await;
    signal_task.abort();

    let mut report = outcome?;
    report.skipped = batch.skipped;
    observer.on_complete(&report);
    Ok(report)
}

/// Resolves `rows` with at most `options.max_concurrency` in flight.
///
/// `cancel` is checked before each row is dispatched. Each result goes to
/// `sink` and then `observer` as soon as it completes.
pub async fn resolve_rows(
    orchestrator: Arc<Orchestrator>,
    rows: Vec<InputRow>,
    sink: &mut dyn ResultSink,
    observer: &dyn ProgressObserver,
    options: &BatchOptions,
    cancel: CancellationToken,
) -> Result<BatchReport> {
    let start_time = Instant::now();
    let total = rows.len();
    let semaphore = init_semaphore(options.max_concurrency.max(1));
    let stats = ResolutionStats::new();
    let mut delivery = Delivery {
        sink,
        observer,
        stats: &stats,
        done: 0,
        total,
    };

    info!(
        "Resolving {total} URL{} with up to {} concurrent (strategies: {})",
        if total == 1 { "" } else { "s" },
        options.max_concurrency,
        orchestrator.strategy_names().join(", ")
    );

    let mut tasks = FuturesUnordered::new();
    let mut cancelled = false;

    for (index, row) in rows.into_iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        // Deliver finished results while waiting for a free slot
        let permit = loop {
            tokio::select! {
                permit = Arc::clone(&semaphore).acquire_owned() => {
                    break permit.context("Concurrency semaphore closed")?;
                }
                Some((request, joined)) = tasks.next(), if !tasks.is_empty() => {
                    delivery.deliver(settle(request, joined))?;
                }
            }
        };

        let request = ResolutionRequest::new(row.url, options.max_redirects, options.timeout)
            .with_row_context(row.context);
        let hint = ProgressHint {
            current: index + 1,
            total,
        };
        let orchestrator = Arc::clone(&orchestrator);
        let task_request = request.clone();
        let handle = tokio::spawn(async move {
            let _permit = permit;
            orchestrator.resolve(&task_request, Some(hint)).await
        });
        tasks.push(async move { (request, handle.await) });
    }

    if cancelled {
        warn!("Cancelled after dispatching {} of {total} URLs", delivery.done + tasks.len());
    }

    while let Some((request, joined)) = tasks.next().await {
        delivery.deliver(settle(request, joined))?;
    }
    delivery.sink.finish()?;

    let resolved = delivery.done;
    print_resolution_statistics(&stats);

    Ok(BatchReport {
        total_rows: total,
        skipped: 0,
        resolved,
        successful: stats.successes(),
        failed: stats.failures(),
        by_status: stats.non_zero(),
        cancelled,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}

/// A panicked or aborted task still yields a row in the output.
fn settle(
    request: ResolutionRequest,
    joined: Result<ResolutionResult, JoinError>,
) -> ResolutionResult {
    match joined {
        Ok(result) => result,
        Err(e) => {
            warn!("Resolution task for {} failed: {e}", request.seed_url());
            ResolutionResult::unresolved(
                &request,
                ResolutionStatus::Error,
                NO_STRATEGY,
                Instant::now(),
            )
        }
    }
}

struct Delivery<'a> {
    sink: &'a mut dyn ResultSink,
    observer: &'a dyn ProgressObserver,
    stats: &'a ResolutionStats,
    done: usize,
    total: usize,
}

impl Delivery<'_> {
    fn deliver(&mut self, result: ResolutionResult) -> Result<()> {
        self.stats.record(result.status, &result.strategy_used);
        self.sink.write_result(&result)?;
        self.done += 1;
        self.observer.on_result(self.done, self.total, &result);
        Ok(())
    }
}

/// Probes every configured proxy against `PROXY_HEALTH_CHECK_URL`.
pub async fn check_proxies(config: &Config) -> Result<Vec<ProxyHealth>> {
    let proxies = load_proxies(config).context("Failed to load proxies")?;
    if proxies.is_empty() {
        anyhow::bail!("No proxies configured; use --proxy or --proxy-file");
    }
    let strategy = ProxyHttpStrategy::new(
        proxies,
        WalkOptions {
            deny_private_targets: config.deny_private_targets,
        },
    )
    .context("Failed to initialize proxy clients")?;
    info!(
        "Checking {} proxies against {PROXY_HEALTH_CHECK_URL}",
        strategy.len()
    );
    Ok(strategy.health_check_all(PROXY_HEALTH_CHECK_URL).await)
}
