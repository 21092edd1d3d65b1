//! Application initialization and resource setup.
//!
//! Builds the shared resources a batch needs before the first URL is read:
//! the logger, the redirect-less HTTP client, the strategy registry and the
//! concurrency semaphore.

mod client;
mod logger;
mod strategies;

use std::sync::Arc;

use tokio::sync::Semaphore;

pub use client::init_redirect_client;
pub use logger::init_logger_with;
pub use strategies::{build_orchestrator, build_strategies, load_proxies};

/// Initializes a semaphore for controlling concurrency.
///
/// One permit is held per in-flight resolution.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count))
}
