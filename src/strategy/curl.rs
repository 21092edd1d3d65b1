//! curl subprocess strategy.
//!
//! A different TLS stack and HTTP client fingerprint than reqwest, which is
//! often enough to get past blocks keyed on either. One `curl --head` per hop;
//! curl never follows redirects itself.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::process::Command;
use tokio::sync::OnceCell;

use super::{RedirectStrategy, CURL_STRATEGY};
use crate::config::{CURL_INFO_MARKER, CURL_PROBE_TIMEOUT, CURL_PROCESS_GRACE, DEFAULT_USER_AGENT};
use crate::resolve::{
    follow_redirects, FailureKind, HopFailure, HopResponse, HopTransport, ResolutionRequest,
    ResolutionResult, WalkOptions,
};

pub struct CurlStrategy {
    binary: String,
    user_agent: String,
    options: WalkOptions,
    available: OnceCell<bool>,
}

impl CurlStrategy {
    pub fn new(binary: impl Into<String>, options: WalkOptions) -> Self {
        Self {
            binary: binary.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            options,
            available: OnceCell::new(),
        }
    }

    fn command(&self, url: &str, timeout: Duration) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--head")
            .arg("--silent")
            .arg("--show-error")
            .arg("--max-time")
            .arg(timeout.as_secs().max(1).to_string())
            .arg("--user-agent")
            .arg(&self.user_agent)
            .arg("--write-out")
            .arg(format!(
                "\n{CURL_INFO_MARKER}%{{http_code}}|%{{url_effective}}|%{{redirect_url}}"
            ))
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

/// `curl --version` exits 0 within the probe timeout.
async fn probe_curl(binary: &str) -> bool {
    let mut command = Command::new(binary);
    command
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    match tokio::time::timeout(CURL_PROBE_TIMEOUT, command.status()).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(e)) => {
            debug!("curl not available ({binary}): {e}");
            false
        }
        Err(_) => {
            debug!("curl --version timed out ({binary})");
            false
        }
    }
}

#[async_trait]
impl HopTransport for CurlStrategy {
    async fn fetch_hop(&self, url: &str, timeout: Duration) -> Result<HopResponse, HopFailure> {
        let output = match tokio::time::timeout(
            timeout + CURL_PROCESS_GRACE,
            self.command(url, timeout).output(),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(HopFailure::no_response(
                    FailureKind::Other,
                    format!("failed to run curl: {e}"),
                ));
            }
            Err(_) => {
                return Err(HopFailure::no_response(
                    FailureKind::Timeout,
                    format!(
                        "curl process timed out after {}s",
                        (timeout + CURL_PROCESS_GRACE).as_secs()
                    ),
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code();
            return Err(HopFailure::no_response(
                curl_failure_kind(code),
                match code {
                    Some(code) => format!("curl exit {code}: {}", stderr.trim()),
                    None => format!("curl killed: {}", stderr.trim()),
                },
            ));
        }

        parse_curl_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Maps curl's exit code; stderr names the host and is never inspected.
fn curl_failure_kind(exit_code: Option<i32>) -> FailureKind {
    match exit_code {
        Some(6) => FailureKind::UnknownHost,
        Some(7) => FailureKind::ConnectionRefused,
        Some(28) => FailureKind::Timeout,
        _ => FailureKind::Other,
    }
}

/// Extracts status and `Location` from curl's output.
///
/// Prefers the `--write-out` info line; falls back to the raw header block
/// (last `HTTP/x NNN` status line, first `location:` header) when the info
/// line is missing or unusable.
pub fn parse_curl_output(output: &str) -> Result<HopResponse, HopFailure> {
    if let Some(info) = output
        .lines()
        .find_map(|line| line.trim().strip_prefix(CURL_INFO_MARKER))
    {
        let mut parts = info.split('|');
        let code = parts.next().and_then(|c| c.trim().parse::<u16>().ok());
        let _effective = parts.next();
        let redirect = parts
            .next()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        match code {
            Some(code) if code > 0 => {
                let location = redirect.or_else(|| header_location(output));
                return Ok(HopResponse {
                    status: code,
                    location,
                    block_signature: None,
                });
            }
            _ => warn!("Unusable curl info line: {info}"),
        }
    }

    match header_status(output) {
        Some(status) => Ok(HopResponse {
            status,
            location: header_location(output),
            block_signature: None,
        }),
        None => Err(HopFailure::Malformed(format!(
            "no status in curl output ({} bytes)",
            output.len()
        ))),
    }
}

fn header_status(output: &str) -> Option<u16> {
    output
        .lines()
        .filter(|line| line.starts_with("HTTP/"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|code| code.parse::<u16>().ok())
        .last()
}

fn header_location(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("location") {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

#[async_trait]
impl RedirectStrategy for CurlStrategy {
    fn name(&self) -> &'static str {
        CURL_STRATEGY
    }

    fn priority(&self) -> u32 {
        30
    }

    async fn is_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| probe_curl(&self.binary))
            .await
    }

    async fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        follow_redirects(self, request, CURL_STRATEGY, self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_redirect() {
        let output = "HTTP/1.1 301 Moved Permanently\r\nLocation: /next\r\n\r\n\nCURL_INFO:301|https://a.com/|https://a.com/next";
        let hop = parse_curl_output(output).expect("parses");
        assert_eq!(hop.status, 301);
        assert_eq!(hop.location.as_deref(), Some("https://a.com/next"));
    }

    #[test]
    fn test_parse_structured_terminal() {
        let output = "HTTP/2 200\r\ncontent-type: text/html\r\n\r\n\nCURL_INFO:200|https://a.com/|";
        let hop = parse_curl_output(output).expect("parses");
        assert_eq!(hop.status, 200);
        assert_eq!(hop.location, None);
    }

    #[test]
    fn test_structured_without_redirect_url_uses_header() {
        let output = "HTTP/1.1 302 Found\r\nlocation: relative/path\r\n\r\n\nCURL_INFO:302|https://a.com/x|";
        let hop = parse_curl_output(output).expect("parses");
        assert_eq!(hop.location.as_deref(), Some("relative/path"));
    }

    #[test]
    fn test_fallback_to_headers() {
        let output = "HTTP/1.1 308 Permanent Redirect\r\nServer: x\r\nLocation: https://b.com/\r\n\r\n";
        let hop = parse_curl_output(output).expect("parses");
        assert_eq!(hop.status, 308);
        assert_eq!(hop.location.as_deref(), Some("https://b.com/"));
    }

    #[test]
    fn test_fallback_uses_last_status_line() {
        let output = "HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 403 Forbidden\r\n\r\n";
        let hop = parse_curl_output(output).expect("parses");
        assert_eq!(hop.status, 403);
    }

    #[test]
    fn test_zero_code_falls_back_then_malformed() {
        let err = parse_curl_output("CURL_INFO:000||").expect_err("no status anywhere");
        assert!(matches!(err, HopFailure::Malformed(_)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            parse_curl_output("<html>hello</html>"),
            Err(HopFailure::Malformed(_))
        ));
    }

    #[test]
    fn test_exit_codes_decide_failure_kind() {
        assert_eq!(curl_failure_kind(Some(6)), FailureKind::UnknownHost);
        assert_eq!(curl_failure_kind(Some(7)), FailureKind::ConnectionRefused);
        assert_eq!(curl_failure_kind(Some(28)), FailureKind::Timeout);
        assert_eq!(curl_failure_kind(Some(60)), FailureKind::Other);
        assert_eq!(curl_failure_kind(None), FailureKind::Other);
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let strategy = CurlStrategy::new("/nonexistent/curl-binary", WalkOptions::default());
        assert!(!strategy.is_available().await);
        // cached
        assert!(!strategy.is_available().await);
    }
}
