//! Resolution statistics tracking.
//!
//! Thread-safe per-status counters for a batch run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use crate::resolve::ResolutionStatus;

/// Thread-safe count of results per `ResolutionStatus`.
///
/// Every status is initialized to zero on creation, so lookups never miss.
/// Shared across tasks with `Arc`.
pub struct ResolutionStats {
    statuses: HashMap<ResolutionStatus, AtomicUsize>,
    strategies: std::sync::Mutex<HashMap<String, usize>>,
}

impl ResolutionStats {
    pub fn new() -> Self {
        let mut statuses = HashMap::new();
        for status in ResolutionStatus::iter() {
            statuses.insert(status, AtomicUsize::new(0));
        }

        ResolutionStats {
            statuses,
            strategies: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Records one finished result.
    pub fn record(&self, status: ResolutionStatus, strategy_used: &str) {
        self.increment(status);
        if status.is_success() {
            if let Ok(mut strategies) = self.strategies.lock() {
                *strategies.entry(strategy_used.to_string()).or_insert(0) += 1;
            }
        }
    }

    pub fn increment(&self, status: ResolutionStatus) {
        if let Some(counter) = self.statuses.get(&status) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in ResolutionStats initialization.",
                status
            );
        }
    }

    pub fn get_count(&self, status: ResolutionStatus) -> usize {
        self.statuses
            .get(&status)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.statuses
            .values()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    pub fn successes(&self) -> usize {
        self.get_count(ResolutionStatus::Success)
    }

    pub fn failures(&self) -> usize {
        self.total() - self.successes()
    }

    /// Successful resolutions per winning strategy, sorted by name.
    pub fn successes_by_strategy(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .strategies
            .lock()
            .map(|s| s.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();
        counts.sort();
        counts
    }

    /// Non-zero counts in taxonomy order.
    pub fn non_zero(&self) -> Vec<(ResolutionStatus, usize)> {
        ResolutionStatus::iter()
            .map(|status| (status, self.get_count(status)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

impl Default for ResolutionStats {
    fn default() -> Self {
        Self::new()
    }
}
