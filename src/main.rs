//! Main application entry point (CLI binary).
//!
//! A thin wrapper around the `redirect_finder` library: argument parsing,
//! logger setup, and the exit code.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use redirect_finder::initialization::init_logger_with;
use redirect_finder::{check_proxies, run_batch, Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config: Config = Cli::parse().into();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if config.check_proxies {
        let health = match check_proxies(&config).await {
            Ok(health) => health,
            Err(e) => {
                eprintln!("redirect_finder error: {e:#}");
                process::exit(1);
            }
        };
        let healthy = health.iter().filter(|h| h.healthy).count();
        for proxy in &health {
            println!(
                "{} {} ({})",
                if proxy.healthy { "OK  " } else { "FAIL" },
                proxy.proxy,
                proxy.detail
            );
        }
        println!("{healthy}/{} proxies healthy", health.len());
        if healthy == 0 {
            process::exit(1);
        }
        return Ok(());
    }

    match run_batch(config).await {
        Ok(report) => {
            eprintln!(
                "Resolved {} URL{} ({} succeeded, {} failed, {} skipped) in {:.1}s",
                report.resolved,
                if report.resolved == 1 { "" } else { "s" },
                report.successful,
                report.failed,
                report.skipped,
                report.elapsed_seconds
            );
            if report.cancelled {
                process::exit(130);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("redirect_finder error: {e:#}");
            process::exit(1);
        }
    }
}
