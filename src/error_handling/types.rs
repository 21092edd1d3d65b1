//! Error type definitions.
//!
//! Only start-up problems are errors. Anything that goes wrong while
//! resolving a URL is reported as a `ResolutionStatus` value instead.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error building the client for one proxy.
    #[error("Proxy client initialization error for {proxy}: {source}")]
    ProxyClientError {
        proxy: String,
        #[source]
        source: ReqwestError,
    },

    /// Configuration rejected before any resolution started.
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
}

/// Invalid configuration, detected before any resolution starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A proxy entry is not `scheme://host:port` with a supported scheme.
    #[error("Invalid proxy '{value}': {reason}")]
    InvalidProxy { value: String, reason: String },

    /// The proxy file could not be read.
    #[error("Cannot read proxy file {}: {source}", path.display())]
    ProxyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A numeric or list setting is out of range.
    #[error("Invalid {name}: {reason}")]
    InvalidLimit { name: &'static str, reason: String },

    /// `--disable` named a strategy that does not exist.
    #[error("Unknown strategy '{0}'")]
    UnknownStrategy(String),
}
