//! Progress notification.

use std::time::Instant;

use log::{info, warn};

use super::BatchReport;
use crate::app::log_progress;
use crate::config::LOGGING_INTERVAL;
use crate::resolve::ResolutionResult;

/// Notified as results complete. Callbacks run on the driver task, so they
/// should return quickly.
pub trait ProgressObserver: Send + Sync {
    /// `done` counts results delivered so far, including this one.
    fn on_result(&self, done: usize, total: usize, result: &ResolutionResult);

    fn on_complete(&self, report: &BatchReport);
}

/// Logs every result, with a rate line every `LOGGING_INTERVAL` results.
pub struct LoggingObserver {
    started: Instant,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for LoggingObserver {
    fn on_result(&self, done: usize, total: usize, result: &ResolutionResult) {
        let line = format!(
            "[{done}/{total}] {} -> {} ({}, {} redirects, {} in {}ms)",
            result.original_url,
            result.final_url,
            result.status,
            result.redirect_count,
            result.strategy_used,
            result.elapsed_ms
        );
        if result.status.is_success() {
            info!("{line}");
        } else {
            warn!("{line}");
        }
        if done % LOGGING_INTERVAL == 0 && done < total {
            log_progress(self.started, done, total);
        }
    }

    fn on_complete(&self, report: &BatchReport) {
        log_progress(self.started, report.resolved, report.total_rows);
        info!(
            "Resolved {} URL{} ({} succeeded, {} failed, {} skipped) in {:.1}s",
            report.resolved,
            if report.resolved == 1 { "" } else { "s" },
            report.successful,
            report.failed,
            report.skipped,
            report.elapsed_seconds
        );
        if report.cancelled {
            warn!(
                "Run was cancelled; {} row(s) were not dispatched",
                report.total_rows - report.resolved
            );
        }
    }
}
