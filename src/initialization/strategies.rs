//! Strategy registry construction.

use std::sync::Arc;

use log::{debug, info};

use super::client::init_redirect_client;
use crate::config::{Config, DEFAULT_USER_AGENT};
use crate::error_handling::{ConfigError, InitializationError};
use crate::resolve::{Orchestrator, WalkOptions};
use crate::strategy::{
    parse_proxies, BrowserStrategy, CurlStrategy, EnhancedHttpStrategy, PlainHttpStrategy,
    ProxyEndpoint, ProxyHttpStrategy, RedirectStrategy, BROWSER_STRATEGY, CURL_STRATEGY,
    ENHANCED_HTTP_STRATEGY, PLAIN_HTTP_STRATEGY, PROXY_HTTP_STRATEGY,
};

/// Collects proxies from `config.proxies` and then `config.proxy_file`.
pub fn load_proxies(config: &Config) -> Result<Vec<ProxyEndpoint>, ConfigError> {
    let mut proxies = parse_proxies(&config.proxies)?;
    if let Some(path) = &config.proxy_file {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ProxyFile {
            path: path.clone(),
            source,
        })?;
        let lines: Vec<&str> = contents.lines().collect();
        proxies.extend(parse_proxies(&lines)?);
    }
    Ok(proxies)
}

/// Builds every enabled strategy.
///
/// Availability is not probed here; the orchestrator asks each strategy
/// when it resolves. Strategies disabled in `config.disable` are not built.
pub fn build_strategies(
    config: &Config,
) -> Result<Vec<Arc<dyn RedirectStrategy>>, InitializationError> {
    config.validate()?;

    let options = WalkOptions {
        deny_private_targets: config.deny_private_targets,
    };
    let mut strategies: Vec<Arc<dyn RedirectStrategy>> = Vec::new();

    if config.is_enabled(PLAIN_HTTP_STRATEGY) {
        let client = init_redirect_client(config)?;
        strategies.push(Arc::new(PlainHttpStrategy::new(client, options)));
    }
    if config.is_enabled(ENHANCED_HTTP_STRATEGY) {
        strategies.push(Arc::new(EnhancedHttpStrategy::new(
            &config.user_agents,
            options,
        )));
    }
    if config.is_enabled(CURL_STRATEGY) {
        strategies.push(Arc::new(CurlStrategy::new(
            config.curl_binary.clone(),
            options,
        )));
    }
    if config.is_enabled(PROXY_HTTP_STRATEGY) {
        let proxies = load_proxies(config)?;
        if proxies.is_empty() {
            debug!("No proxies configured; {PROXY_HTTP_STRATEGY} will be skipped");
        }
        strategies.push(Arc::new(ProxyHttpStrategy::new(proxies, options)?));
    }
    if config.is_enabled(BROWSER_STRATEGY) {
        let user_agent = config
            .user_agents
            .iter()
            .find(|ua| !ua.trim().is_empty())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENT);
        strategies.push(Arc::new(BrowserStrategy::new(
            &config.browser_poll_secs,
            user_agent,
            options,
        )));
    }

    info!(
        "Registered strategies: {}",
        strategies
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(strategies)
}

/// `build_strategies` wrapped in an orchestrator with the configured pause
/// and browser preference.
pub fn build_orchestrator(config: &Config) -> Result<Orchestrator, InitializationError> {
    Ok(Orchestrator::new(build_strategies(config)?)
        .with_pause(config.strategy_pause())
        .with_prefer_browser(config.prefer_browser))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_all_strategies_registered_by_default() {
        let strategies = build_strategies(&Config::default()).expect("default config builds");
        let names: Vec<&str> = strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, crate::strategy::STRATEGY_NAMES.to_vec());
    }

    #[test]
    fn test_disabled_strategies_are_not_built() {
        let config = Config {
            disable: vec!["CURL".to_string(), "browser".to_string()],
            ..Default::default()
        };
        let strategies = build_strategies(&config).expect("builds");
        let names: Vec<&str> = strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["plain-http", "enhanced-http", "proxy-http"]);
    }

    #[test]
    fn test_unknown_disable_name_rejected() {
        let config = Config {
            disable: vec!["selenium".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            build_strategies(&config),
            Err(InitializationError::ConfigError(ConfigError::UnknownStrategy(_)))
        ));
    }

    #[test]
    fn test_load_proxies_merges_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "# pool\nsocks5://10.0.0.2:1080\n\nhttp://10.0.0.3:8080").expect("write");
        let config = Config {
            proxies: vec!["http://10.0.0.1:3128".to_string()],
            proxy_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let proxies = load_proxies(&config).expect("valid proxies");
        let urls: Vec<String> = proxies.iter().map(|p| p.url()).collect();
        assert_eq!(
            urls,
            vec![
                "http://10.0.0.1:3128",
                "socks5://10.0.0.2:1080",
                "http://10.0.0.3:8080"
            ]
        );
    }

    #[test]
    fn test_missing_proxy_file_is_config_error() {
        let config = Config {
            proxy_file: Some("/nonexistent/proxies.txt".into()),
            ..Default::default()
        };
        assert!(matches!(
            load_proxies(&config),
            Err(ConfigError::ProxyFile { .. })
        ));
    }

    #[test]
    fn test_bad_proxy_fails_startup() {
        let config = Config {
            proxies: vec!["ftp://10.0.0.1:21".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            build_strategies(&config),
            Err(InitializationError::ConfigError(ConfigError::InvalidProxy { .. }))
        ));
    }
}
