//! redirect_finder library: final-destination resolution for URLs
//!
//! Walks redirect chains hop by hop and, when a target blocks or fails one
//! technique, falls back through the next: plain HTTP, an enhanced browser
//! imitation with cookies, `curl`, a rotating proxy pool, and (with the
//! `browser` feature) headless Chrome.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use redirect_finder::initialization::build_orchestrator;
//! use redirect_finder::resolve::ResolutionRequest;
//! use redirect_finder::Config;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = build_orchestrator(&Config::default())?;
//! let request = ResolutionRequest::new("https://bit.ly/example", 5, Duration::from_secs(10));
//! let result = orchestrator.resolve(&request, None).await;
//! println!("{} -> {} ({})", result.original_url, result.final_url, result.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

mod app;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod input;
pub mod output;
pub mod resolve;
mod run;
mod security;
pub mod strategy;

// Re-export public API
pub use config::{Cli, Config, LogFormat, LogLevel};
pub use error_handling::{ConfigError, InitializationError, ResolutionStats};
pub use resolve::{
    Orchestrator, ResolutionRequest, ResolutionResult, ResolutionStatus, RowContext,
};
pub use run::{
    check_proxies, resolve_rows, run_batch, BatchOptions, BatchReport, LoggingObserver,
    ProgressObserver,
};
pub use strategy::RedirectStrategy;
