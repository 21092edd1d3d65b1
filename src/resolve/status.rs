//! Closed status taxonomy for resolution results.

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter as EnumIterMacro;

/// Outcome classification of a single URL resolution.
///
/// Every `ResolutionResult` carries exactly one of these. The classifier in
/// `resolve::classify` is the only place that maps raw transport outcomes
/// onto the transport-level variants; the orchestrator adds the last two.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStatus {
    /// Terminal 2xx response (or a redirect without a usable Location)
    Success,
    /// 401/403/429 or a content-based block signature
    Blocked,
    /// 404 Not Found
    NotFound,
    /// No response before the hop timeout elapsed
    Timeout,
    /// Host name could not be resolved
    UnknownHost,
    /// Connection refused or host unreachable
    ConnectionRefused,
    /// 5xx, malformed response, or any unrecognised transport failure
    Error,
    /// More redirects than the request allows
    MaxRedirectsExceeded,
    /// No registered strategy reported itself available
    NoStrategiesAvailable,
    /// Every strategy ran and none produced a result worth keeping
    AllStrategiesFailed,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Success => "SUCCESS",
            ResolutionStatus::Blocked => "BLOCKED",
            ResolutionStatus::NotFound => "NOT_FOUND",
            ResolutionStatus::Timeout => "TIMEOUT",
            ResolutionStatus::UnknownHost => "UNKNOWN_HOST",
            ResolutionStatus::ConnectionRefused => "CONNECTION_REFUSED",
            ResolutionStatus::Error => "ERROR",
            ResolutionStatus::MaxRedirectsExceeded => "MAX_REDIRECTS_EXCEEDED",
            ResolutionStatus::NoStrategiesAvailable => "NO_STRATEGIES_AVAILABLE",
            ResolutionStatus::AllStrategiesFailed => "ALL_STRATEGIES_FAILED",
        }
    }

    /// True only for `Success`; the orchestrator stops on the first one.
    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionStatus::Success)
    }

    /// True for `Blocked`, the status that signals active refusal rather than an outage.
    pub fn is_blocked(&self) -> bool {
        matches!(self, ResolutionStatus::Blocked)
    }
}

impl std::fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_as_str_matches_serde_name() {
        for status in ResolutionStatus::iter() {
            let json = serde_json::to_string(&status).expect("status serializes");
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_taxonomy_is_closed_at_ten_members() {
        assert_eq!(ResolutionStatus::iter().count(), 10);
    }

    #[test]
    fn test_only_success_is_success() {
        let successes: Vec<_> = ResolutionStatus::iter().filter(|s| s.is_success()).collect();
        assert_eq!(successes, vec![ResolutionStatus::Success]);
        assert!(ResolutionStatus::Blocked.is_blocked());
        assert!(!ResolutionStatus::Timeout.is_blocked());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ResolutionStatus::MaxRedirectsExceeded.to_string(),
            "MAX_REDIRECTS_EXCEEDED"
        );
    }
}
