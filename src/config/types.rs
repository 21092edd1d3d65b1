//! Configuration types and CLI options.
//!
//! `Cli` is the clap-facing surface; `Config` is the library configuration
//! the rest of the crate consumes and can be built without clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_BROWSER_POLL_SECS, DEFAULT_CURL_BINARY, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MAX_REDIRECTS, DEFAULT_STRATEGY_PAUSE_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENTS,
};
use crate::error_handling::ConfigError;
use crate::strategy::STRATEGY_NAMES;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: One JSON object per line for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use redirect_finder::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     file: PathBuf::from("urls.csv"),
///     max_concurrency: 4,
///     disable: vec!["curl".to_string()],
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// File to read rows from (`-` for stdin)
    pub file: PathBuf,

    /// CSV output path; stdout when `None`
    pub output: Option<PathBuf>,

    pub log_level: LogLevel,
    pub log_format: LogFormat,

    /// Maximum redirects followed per URL
    pub max_redirects: usize,

    /// Per-hop timeout in seconds
    pub timeout_seconds: u64,

    /// Maximum concurrent resolutions
    pub max_concurrency: usize,

    /// Pause between strategy attempts on the same URL, in milliseconds
    pub strategy_pause_ms: u64,

    /// User-Agent rotation pool for the enhanced strategy
    pub user_agents: Vec<String>,

    /// Proxies as `scheme://host:port` (`http` or `socks5`)
    pub proxies: Vec<String>,

    /// File with one proxy per line; merged with `proxies`
    pub proxy_file: Option<PathBuf>,

    /// Strategy names to leave out of the registry
    pub disable: Vec<String>,

    /// Only use the browser strategy
    pub prefer_browser: bool,

    /// Refuse redirects into localhost/private address space
    pub deny_private_targets: bool,

    /// curl executable name or path
    pub curl_binary: String,

    /// Browser URL polling schedule, in seconds
    pub browser_poll_secs: Vec<u64>,

    /// Probe every proxy and exit instead of resolving
    pub check_proxies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("urls.csv"),
            output: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            strategy_pause_ms: DEFAULT_STRATEGY_PAUSE_MS,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            proxies: Vec::new(),
            proxy_file: None,
            disable: Vec::new(),
            prefer_browser: false,
            deny_private_targets: false,
            curl_binary: DEFAULT_CURL_BINARY.to_string(),
            browser_poll_secs: DEFAULT_BROWSER_POLL_SECS.to_vec(),
            check_proxies: false,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn strategy_pause(&self) -> Duration {
        Duration::from_millis(self.strategy_pause_ms)
    }

    pub fn is_enabled(&self, strategy_name: &str) -> bool {
        !self
            .disable
            .iter()
            .any(|name| name.eq_ignore_ascii_case(strategy_name))
    }

    /// Rejects settings that would make every resolution fail or hang.
    ///
    /// Proxy syntax is checked separately when the proxy pool is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "max_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "timeout_seconds",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return Err(ConfigError::InvalidLimit {
                name: "user_agents",
                reason: "pool must contain at least one non-empty User-Agent".to_string(),
            });
        }
        if self.browser_poll_secs.is_empty() {
            return Err(ConfigError::InvalidLimit {
                name: "browser_poll_secs",
                reason: "schedule must contain at least one wait".to_string(),
            });
        }
        if let Some(unknown) = self
            .disable
            .iter()
            .find(|name| !STRATEGY_NAMES.iter().any(|known| known.eq_ignore_ascii_case(name)))
        {
            return Err(ConfigError::UnknownStrategy(unknown.clone()));
        }
        Ok(())
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Resolve every URL in a CSV, results to stdout
/// redirect_finder urls.csv
///
/// # Two proxies, no browser, results to a file
/// redirect_finder urls.csv --proxy http://10.0.0.1:3128 --proxy socks5://10.0.0.2:1080 \
///     --disable browser --output resolved.csv
///
/// # Check the proxy pool and exit
/// redirect_finder urls.csv --proxy-file proxies.txt --check-proxies
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "redirect_finder",
    about = "Resolves the final destination of URLs, falling back across anti-blocking strategies."
)]
pub struct Cli {
    /// File to read (`url[,id[,model]]` per line, `-` for stdin)
    #[arg(value_parser)]
    pub file: PathBuf,

    /// Write CSV results here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Maximum redirects followed per URL
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Per-hop timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Maximum concurrent resolutions
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Pause between strategy attempts on the same URL (milliseconds)
    #[arg(long, default_value_t = DEFAULT_STRATEGY_PAUSE_MS)]
    pub strategy_pause_ms: u64,

    /// User-Agent for the rotation pool (repeatable; replaces the built-in pool)
    #[arg(long = "user-agent")]
    pub user_agents: Vec<String>,

    /// Proxy as scheme://host:port, http or socks5 (repeatable)
    #[arg(long = "proxy")]
    pub proxies: Vec<String>,

    /// File with one proxy per line (`#` comments allowed)
    #[arg(long)]
    pub proxy_file: Option<PathBuf>,

    /// Strategy to disable: plain-http|enhanced-http|curl|proxy-http|browser (repeatable)
    #[arg(long)]
    pub disable: Vec<String>,

    /// Resolve with the browser strategy only
    #[arg(long)]
    pub prefer_browser: bool,

    /// Refuse redirects to localhost, private, loopback and link-local targets
    #[arg(long)]
    pub deny_private_targets: bool,

    /// curl executable
    #[arg(long, default_value = DEFAULT_CURL_BINARY)]
    pub curl_binary: String,

    /// Browser polling schedule in seconds, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_BROWSER_POLL_SECS)]
    pub browser_poll_secs: Vec<u64>,

    /// Probe every configured proxy, report, and exit
    #[arg(long)]
    pub check_proxies: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let user_agents = if cli.user_agents.is_empty() {
            Config::default().user_agents
        } else {
            cli.user_agents
        };
        Self {
            file: cli.file,
            output: cli.output,
            log_level: cli.log_level,
            log_format: cli.log_format,
            max_redirects: cli.max_redirects,
            timeout_seconds: cli.timeout_seconds,
            max_concurrency: cli.max_concurrency,
            strategy_pause_ms: cli.strategy_pause_ms,
            user_agents,
            proxies: cli.proxies,
            proxy_file: cli.proxy_file,
            disable: cli.disable,
            prefer_browser: cli.prefer_browser,
            deny_private_targets: cli.deny_private_targets,
            curl_binary: cli.curl_binary,
            browser_poll_secs: cli.browser_poll_secs,
            check_proxies: cli.check_proxies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.strategy_pause(), Duration::from_millis(200));
        assert_eq!(config.user_agents.len(), 5);
        assert_eq!(config.browser_poll_secs, vec![2, 3, 5]);
        assert!(config.proxies.is_empty());
        assert!(!config.prefer_browser);
        assert!(!config.deny_private_targets);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["redirect_finder", "urls.csv"]).expect("parses");
        let config = Config::from(cli);
        let defaults = Config::default();
        assert_eq!(config.file, PathBuf::from("urls.csv"));
        assert_eq!(config.max_redirects, defaults.max_redirects);
        assert_eq!(config.timeout_seconds, defaults.timeout_seconds);
        assert_eq!(config.max_concurrency, defaults.max_concurrency);
        assert_eq!(config.strategy_pause_ms, defaults.strategy_pause_ms);
        assert_eq!(config.user_agents, defaults.user_agents);
        assert_eq!(config.browser_poll_secs, defaults.browser_poll_secs);
        assert_eq!(config.curl_binary, "curl");
    }

    #[test]
    fn test_cli_repeatable_and_delimited_flags() {
        let cli = Cli::try_parse_from([
            "redirect_finder",
            "urls.csv",
            "--proxy",
            "http://10.0.0.1:3128",
            "--proxy",
            "socks5://10.0.0.2:1080",
            "--disable",
            "curl",
            "--user-agent",
            "TestAgent/1.0",
            "--browser-poll-secs",
            "1,1",
            "--prefer-browser",
        ])
        .expect("parses");
        let config = Config::from(cli);
        assert_eq!(config.proxies.len(), 2);
        assert_eq!(config.user_agents, vec!["TestAgent/1.0".to_string()]);
        assert_eq!(config.browser_poll_secs, vec![1, 1]);
        assert!(config.prefer_browser);
        assert!(!config.is_enabled("curl"));
        assert!(config.is_enabled("plain-http"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimit {
                name: "max_concurrency",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_strategy() {
        let config = Config {
            disable: vec!["selenium".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownStrategy(name)) if name == "selenium"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_user_agent_pool() {
        let config = Config {
            user_agents: vec!["  ".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
