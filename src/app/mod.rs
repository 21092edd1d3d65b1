//! Batch-level helpers: seed URL validation, progress logging and the
//! end-of-run summary.

pub mod logging;
pub mod statistics;
pub mod url;

pub use logging::log_progress;
pub use statistics::print_resolution_statistics;
pub use url::normalize_seed_url;
