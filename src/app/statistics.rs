//! End-of-run statistics.

use log::info;

use crate::error_handling::ResolutionStats;

/// Logs per-status counts and which strategies produced the successes.
pub fn print_resolution_statistics(stats: &ResolutionStats) {
    let total = stats.total();
    if total == 0 {
        info!("No URLs resolved");
        return;
    }

    info!("Status Counts ({total} total):");
    for (status, count) in stats.non_zero() {
        info!("   {}: {}", status.as_str(), count);
    }

    let by_strategy = stats.successes_by_strategy();
    if !by_strategy.is_empty() {
        info!("Successes by strategy:");
        for (strategy, count) in by_strategy {
            info!("   {strategy}: {count}");
        }
    }
}
