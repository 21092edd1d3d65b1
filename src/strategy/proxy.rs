//! Proxy rotation strategy.
//!
//! Each resolution goes out through one proxy, picked round-robin from a
//! pool validated at start-up. One client is pre-built per proxy.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};

use super::headers::RequestHeaders;
use super::rotation::RoundRobin;
use super::transport::{redirectless_client_builder, send_hop};
use super::{RedirectStrategy, PROXY_HTTP_STRATEGY};
use crate::config::{DEFAULT_USER_AGENT, PROXY_HEALTH_CHECK_TIMEOUT};
use crate::error_handling::{ConfigError, InitializationError};
use crate::resolve::{
    describe_reqwest_error, follow_redirects, HopFailure, HopResponse, HopTransport,
    ResolutionRequest, ResolutionResult, ResolutionStatus, WalkOptions, NO_STRATEGY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyScheme {
    Http,
    Socks5,
}

impl ProxyScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Socks5 => "socks5",
        }
    }
}

/// A validated `scheme://host:port` proxy address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub scheme: ProxyScheme,
    pub host: String,
    pub port: u16,
}

impl ProxyEndpoint {
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

impl FromStr for ProxyEndpoint {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidProxy {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = value.trim();
        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| invalid("expected scheme://host:port"))?;
        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "http" => ProxyScheme::Http,
            "socks5" => ProxyScheme::Socks5,
            other => return Err(invalid(&format!("unsupported scheme '{other}'"))),
        };
        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?;
        if host.is_empty() || host.contains('/') || host.contains('@') {
            return Err(invalid("invalid host"));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| invalid("port must be a number between 1 and 65535"))?;
        if port == 0 {
            return Err(invalid("port must be a number between 1 and 65535"));
        }
        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }
}

/// Parses every entry, failing on the first malformed one.
pub fn parse_proxies<S: AsRef<str>>(entries: &[S]) -> Result<Vec<ProxyEndpoint>, ConfigError> {
    entries
        .iter()
        .map(|entry| entry.as_ref())
        .filter(|entry| {
            let entry = entry.trim();
            !entry.is_empty() && !entry.starts_with('#')
        })
        .map(ProxyEndpoint::from_str)
        .collect()
}

/// Outcome of probing one proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyHealth {
    pub proxy: String,
    pub healthy: bool,
    pub detail: String,
}

struct ProxyClient {
    endpoint: ProxyEndpoint,
    client: reqwest::Client,
}

pub struct ProxyHttpStrategy {
    pool: RoundRobin<ProxyClient>,
    options: WalkOptions,
}

impl ProxyHttpStrategy {
    pub fn new(
        endpoints: Vec<ProxyEndpoint>,
        options: WalkOptions,
    ) -> Result<Self, InitializationError> {
        let mut clients = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let client = build_proxy_client(&endpoint).map_err(|source| {
                InitializationError::ProxyClientError {
                    proxy: endpoint.url(),
                    source,
                }
            })?;
            clients.push(ProxyClient { endpoint, client });
        }
        if !clients.is_empty() {
            info!("Proxy pool ready with {} proxies", clients.len());
        }
        Ok(Self {
            pool: RoundRobin::new(clients),
            options,
        })
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Probes every proxy with a GET to `test_url`; healthy means HTTP 200.
    pub async fn health_check_all(&self, test_url: &str) -> Vec<ProxyHealth> {
        let checks = self.pool.items().iter().map(|proxy| async move {
            let started = Instant::now();
            let outcome = proxy
                .client
                .get(test_url)
                .timeout(PROXY_HEALTH_CHECK_TIMEOUT)
                .send()
                .await;
            let (healthy, detail) = match outcome {
                Ok(response) if response.status().as_u16() == 200 => {
                    (true, format!("200 in {}ms", started.elapsed().as_millis()))
                }
                Ok(response) => (false, format!("HTTP {}", response.status().as_u16())),
                Err(e) => (false, describe_reqwest_error(e)),
            };
            if healthy {
                info!("Proxy {} healthy ({detail})", proxy.endpoint);
            } else {
                warn!("Proxy {} unhealthy: {detail}", proxy.endpoint);
            }
            ProxyHealth {
                proxy: proxy.endpoint.url(),
                healthy,
                detail,
            }
        });
        join_all(checks).await
    }
}

fn build_proxy_client(endpoint: &ProxyEndpoint) -> Result<reqwest::Client, reqwest::Error> {
    redirectless_client_builder()
        .proxy(reqwest::Proxy::all(endpoint.url())?)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
}

struct Routed<'a> {
    client: &'a reqwest::Client,
}

#[async_trait]
impl HopTransport for Routed<'_> {
    async fn fetch_hop(&self, url: &str, timeout: Duration) -> Result<HopResponse, HopFailure> {
        send_hop(
            RequestHeaders::apply_to_request_builder(self.client.get(url)),
            timeout,
        )
        .await
    }
}

#[async_trait]
impl RedirectStrategy for ProxyHttpStrategy {
    fn name(&self) -> &'static str {
        PROXY_HTTP_STRATEGY
    }

    fn priority(&self) -> u32 {
        40
    }

    async fn is_available(&self) -> bool {
        !self.pool.is_empty()
    }

    async fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        let Some(proxy) = self.pool.next() else {
            return ResolutionResult::unresolved(
                request,
                ResolutionStatus::NoStrategiesAvailable,
                NO_STRATEGY,
                Instant::now(),
            );
        };
        debug!(
            "[{PROXY_HTTP_STRATEGY}] {} via {}",
            request.seed_url(),
            proxy.endpoint
        );
        let routed = Routed {
            client: &proxy.client,
        };
        follow_redirects(&routed, request, PROXY_HTTP_STRATEGY, self.options).await
    }
}
