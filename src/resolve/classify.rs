//! Transport outcome classification.
//!
//! Every strategy funnels its raw outcome through [`classify`], so the
//! status taxonomy stays identical regardless of which technique produced it.

use std::error::Error as StdError;
use std::io;

use super::status::ResolutionStatus;

/// HTTP status codes that carry a followable `Location`.
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// HTTP status codes that signal active refusal.
pub const BLOCKED_STATUSES: [u16; 3] = [401, 403, 429];

/// Case-insensitive phrases that mark a 2xx page as a block/challenge page.
pub const BLOCK_SIGNATURES: &[&str] = &[
    "captcha",
    "recaptcha",
    "cf-chl-",
    "challenge-platform",
    "checking your browser",
    "attention required! | cloudflare",
    "access denied",
    "rate limit",
    "too many requests",
    "доступ ограничен",
];

/// Source-chain wording for DNS failures. Only the error's causes are
/// searched, never the request URL.
const UNKNOWN_HOST_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "nodename nor servname",
];

const UNREACHABLE_MARKERS: &[&str] = &["connection refused", "unreachable"];

/// Chromium network error codes, as reported by a failed navigation.
const NET_TIMEOUT_CODES: &[&str] = &["net::err_timed_out", "net::err_connection_timed_out"];
const NET_UNKNOWN_HOST_CODES: &[&str] = &[
    "net::err_name_not_resolved",
    "net::err_name_resolution_failed",
];
const NET_REFUSED_CODES: &[&str] = &[
    "net::err_connection_refused",
    "net::err_address_unreachable",
    "net::err_internet_disconnected",
];

/// Why a hop got no response. Decided by the transport from typed signals
/// (error flags, io error kinds, tool exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    UnknownHost,
    ConnectionRefused,
    Other,
}

impl FailureKind {
    pub fn status(self) -> ResolutionStatus {
        match self {
            FailureKind::Timeout => ResolutionStatus::Timeout,
            FailureKind::UnknownHost => ResolutionStatus::UnknownHost,
            FailureKind::ConnectionRefused => ResolutionStatus::ConnectionRefused,
            FailureKind::Other => ResolutionStatus::Error,
        }
    }

    /// Inspects reqwest's timeout flag and the error's source chain.
    ///
    /// The top-level error is skipped: its display carries the request URL.
    /// `is_connect()` alone says nothing about refusal (TLS handshake and
    /// certificate failures set it too), so it is not consulted.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            return FailureKind::Timeout;
        }
        let mut kind = FailureKind::Other;
        let mut source = error.source();
        while let Some(cause) = source {
            if let Some(io) = cause.downcast_ref::<io::Error>() {
                match io.kind() {
                    io::ErrorKind::ConnectionRefused => return FailureKind::ConnectionRefused,
                    io::ErrorKind::TimedOut => return FailureKind::Timeout,
                    _ => {}
                }
            }
            if kind == FailureKind::Other {
                let message = cause.to_string().to_lowercase();
                if contains_any(&message, UNKNOWN_HOST_MARKERS) {
                    kind = FailureKind::UnknownHost;
                } else if contains_any(&message, UNREACHABLE_MARKERS) {
                    kind = FailureKind::ConnectionRefused;
                }
            }
            source = cause.source();
        }
        kind
    }

    /// Maps a Chromium `net::ERR_*` code found in a navigation error.
    pub fn from_net_error(message: &str) -> Self {
        let lower = message.to_lowercase();
        if contains_any(&lower, NET_TIMEOUT_CODES) {
            FailureKind::Timeout
        } else if contains_any(&lower, NET_UNKNOWN_HOST_CODES) {
            FailureKind::UnknownHost
        } else if contains_any(&lower, NET_REFUSED_CODES) {
            FailureKind::ConnectionRefused
        } else {
            FailureKind::Other
        }
    }
}

/// Raw result of a single hop, before it is mapped onto the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOutcome {
    /// No HTTP response was received at all.
    NoResponse { kind: FailureKind },
    /// Something answered, but it could not be interpreted (e.g. unparseable tool output).
    Malformed,
    /// A status line was received.
    Response { status: u16, block_signature: bool },
}

/// Maps a transport outcome onto the status taxonomy.
///
/// Redirect statuses never reach this function: the protocol loop handles
/// them before classification.
pub fn classify(outcome: &TransportOutcome) -> ResolutionStatus {
    match *outcome {
        TransportOutcome::NoResponse { kind } => kind.status(),
        TransportOutcome::Malformed => ResolutionStatus::Error,
        TransportOutcome::Response {
            status,
            block_signature,
        } => classify_status_code(status, block_signature),
    }
}

fn classify_status_code(status: u16, block_signature: bool) -> ResolutionStatus {
    match status {
        200..=299 if block_signature => ResolutionStatus::Blocked,
        200..=299 => ResolutionStatus::Success,
        s if BLOCKED_STATUSES.contains(&s) => ResolutionStatus::Blocked,
        404 => ResolutionStatus::NotFound,
        _ => ResolutionStatus::Error,
    }
}

pub fn is_redirect_status(status: u16) -> bool {
    REDIRECT_STATUSES.contains(&status)
}

/// Returns the first block signature found in `text`, if any.
pub fn detect_block_signature(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    BLOCK_SIGNATURES
        .iter()
        .copied()
        .find(|signature| lower.contains(signature))
}

/// Flattens a reqwest error and its source chain into one log line, with
/// the URL stripped.
///
/// reqwest's top-level display is often just "error sending request"; the
/// useful wording (DNS, refused, TLS) lives further down the chain.
pub fn describe_reqwest_error(error: reqwest::Error) -> String {
    let error = error.without_url();
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> ResolutionStatus {
        classify(&TransportOutcome::Response {
            status,
            block_signature: false,
        })
    }

    #[test]
    fn test_2xx_is_success() {
        assert_eq!(response(200), ResolutionStatus::Success);
        assert_eq!(response(204), ResolutionStatus::Success);
    }

    #[test]
    fn test_2xx_with_block_signature_is_blocked() {
        let status = classify(&TransportOutcome::Response {
            status: 200,
            block_signature: true,
        });
        assert_eq!(status, ResolutionStatus::Blocked);
    }

    #[test]
    fn test_refusal_codes_are_blocked() {
        for code in [401, 403, 429] {
            assert_eq!(response(code), ResolutionStatus::Blocked, "code {code}");
        }
    }

    #[test]
    fn test_404_is_not_found() {
        assert_eq!(response(404), ResolutionStatus::NotFound);
    }

    #[test]
    fn test_other_codes_are_errors() {
        for code in [400, 410, 500, 502, 503, 100] {
            assert_eq!(response(code), ResolutionStatus::Error, "code {code}");
        }
    }

    #[test]
    fn test_malformed_is_error() {
        assert_eq!(classify(&TransportOutcome::Malformed), ResolutionStatus::Error);
    }

    #[test]
    fn test_failure_kinds_map_to_statuses() {
        let cases = [
            (FailureKind::Timeout, ResolutionStatus::Timeout),
            (FailureKind::UnknownHost, ResolutionStatus::UnknownHost),
            (FailureKind::ConnectionRefused, ResolutionStatus::ConnectionRefused),
            (FailureKind::Other, ResolutionStatus::Error),
        ];
        for (kind, expected) in cases {
            assert_eq!(classify(&TransportOutcome::NoResponse { kind }), expected);
        }
    }

    #[test]
    fn test_browser_net_errors() {
        assert_eq!(
            FailureKind::from_net_error("net::ERR_NAME_NOT_RESOLVED"),
            FailureKind::UnknownHost
        );
        assert_eq!(
            FailureKind::from_net_error("net::ERR_CONNECTION_REFUSED"),
            FailureKind::ConnectionRefused
        );
        assert_eq!(
            FailureKind::from_net_error("net::ERR_TIMED_OUT"),
            FailureKind::Timeout
        );
        assert_eq!(
            FailureKind::from_net_error("net::ERR_CERT_AUTHORITY_INVALID"),
            FailureKind::Other
        );
    }

    #[test]
    fn test_net_error_ignores_plain_words() {
        assert_eq!(
            FailureKind::from_net_error("navigation to https://timeout.example/ failed"),
            FailureKind::Other
        );
    }

    #[test]
    fn test_redirect_statuses() {
        for code in [301, 302, 303, 307, 308] {
            assert!(is_redirect_status(code));
        }
        assert!(!is_redirect_status(300));
        assert!(!is_redirect_status(304));
    }

    #[test]
    fn test_detect_block_signature() {
        assert_eq!(
            detect_block_signature("<title>Please complete the CAPTCHA</title>"),
            Some("captcha")
        );
        assert_eq!(
            detect_block_signature("<h1>Access Denied</h1>"),
            Some("access denied")
        );
        assert_eq!(detect_block_signature("Доступ ограничен"), Some("доступ ограничен"));
        assert_eq!(detect_block_signature("<h1>Welcome to the shop</h1>"), None);
    }
}
