//! Progress logging utilities.

use log::info;

/// Logs completed/total with the running rate.
pub fn log_progress(start_time: std::time::Instant, completed: usize, total: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    let percent = if total > 0 {
        completed as f64 * 100.0 / total as f64
    } else {
        100.0
    };
    info!(
        "Resolved {completed}/{total} URLs ({percent:.1}%) in {elapsed_secs:.2}s (~{rate:.2} URLs/sec)"
    );
}
