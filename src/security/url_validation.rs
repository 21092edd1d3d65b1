//! SSRF checks for hop targets.

use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;
use url::{Host, Url};

/// Why a hop target was refused.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UnsafeTarget {
    #[error("unparseable URL '{url}': {reason}")]
    Unparseable { url: String, reason: String },

    #[error("scheme '{scheme}' is not http or https: {url}")]
    Scheme { scheme: String, url: String },

    #[error("URL has no host: {0}")]
    NoHost(String),

    #[error("localhost target '{host}' refused: {url}")]
    Localhost { host: String, url: String },

    #[error("private address '{host}' refused: {url}")]
    PrivateAddress { host: String, url: String },
}

/// Accepts only http(s) URLs whose host is a public name or address.
///
/// Hostnames are not resolved; a public name that points at a private
/// address passes.
pub fn validate_url_safe(url_str: &str) -> Result<(), UnsafeTarget> {
    let url = Url::parse(url_str).map_err(|e| UnsafeTarget::Unparseable {
        url: url_str.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UnsafeTarget::Scheme {
            scheme: url.scheme().to_string(),
            url: url_str.to_string(),
        });
    }

    match url.host() {
        None => Err(UnsafeTarget::NoHost(url_str.to_string())),
        Some(Host::Domain(domain)) if is_localhost_domain(domain) => Err(UnsafeTarget::Localhost {
            host: domain.to_string(),
            url: url_str.to_string(),
        }),
        Some(Host::Ipv4(ip)) if is_private_ipv4(ip) => Err(UnsafeTarget::PrivateAddress {
            host: ip.to_string(),
            url: url_str.to_string(),
        }),
        Some(Host::Ipv6(ip)) if is_private_ipv6(ip) => Err(UnsafeTarget::PrivateAddress {
            host: ip.to_string(),
            url: url_str.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

/// Loopback, RFC 1918, link-local, "this network", multicast and reserved.
fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_multicast()
        || ip.octets()[0] == 0
        || ip.octets()[0] >= 240
}

fn is_private_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_private_ipv4(mapped);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link-local
        || (first & 0xffc0) == 0xfe80
}

fn is_localhost_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    domain == "localhost" || domain == "localhost.localdomain" || domain.ends_with(".localhost")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_targets_pass() {
        for url in [
            "https://example.com",
            "http://example.com:8080/path?q=1",
            "http://192.0.2.1",
            "http://8.8.8.8",
            "http://[2001:db8::1]/",
        ] {
            assert!(validate_url_safe(url).is_ok(), "{url} should pass");
        }
    }

    #[test]
    fn test_private_ipv4_refused() {
        for url in [
            "http://127.0.0.1",
            "http://127.0.0.1:8080/admin",
            "http://10.0.0.1",
            "http://172.16.0.1",
            "http://172.31.255.255",
            "http://192.168.1.1",
            "http://169.254.169.254/latest/meta-data",
            "http://0.0.0.0",
            "http://224.0.0.1",
            "http://255.255.255.255",
        ] {
            assert!(
                matches!(validate_url_safe(url), Err(UnsafeTarget::PrivateAddress { .. })),
                "{url} should be refused"
            );
        }
        assert!(validate_url_safe("http://172.32.0.1").is_ok());
    }

    #[test]
    fn test_private_ipv6_refused() {
        for url in [
            "http://[::1]",
            "http://[fc00::1]",
            "http://[fe80::1]",
            "http://[ff02::1]",
            "http://[::ffff:127.0.0.1]",
        ] {
            assert!(validate_url_safe(url).is_err(), "{url} should be refused");
        }
    }

    #[test]
    fn test_localhost_names_refused() {
        for url in [
            "http://localhost",
            "http://LOCALHOST:8080",
            "http://localhost.",
            "http://localhost.localdomain",
            "http://api.localhost",
        ] {
            assert!(
                matches!(validate_url_safe(url), Err(UnsafeTarget::Localhost { .. })),
                "{url} should be refused"
            );
        }
        assert!(validate_url_safe("http://localhost.example.com").is_ok());
    }

    #[test]
    fn test_schemes_and_garbage_refused() {
        assert!(matches!(
            validate_url_safe("file:///etc/passwd"),
            Err(UnsafeTarget::Scheme { .. })
        ));
        assert!(matches!(
            validate_url_safe("ftp://example.com"),
            Err(UnsafeTarget::Scheme { .. })
        ));
        assert!(matches!(
            validate_url_safe("not-a-url"),
            Err(UnsafeTarget::Unparseable { .. })
        ));
        assert!(validate_url_safe("").is_err());
    }
}
