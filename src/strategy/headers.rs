//! Browser-like request headers.
//!
//! Modern bot detection looks at header sets as much as at the User-Agent,
//! so every HTTP strategy sends a full navigation header set. The plain
//! strategy sends a fixed one; the enhanced strategy varies it per
//! resolution.

use reqwest::header::{HeaderName, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER, UPGRADE_INSECURE_REQUESTS};
use reqwest::RequestBuilder;

use crate::config::{
    BROWSER_ACCEPT, BROWSER_ACCEPT_LANGUAGE, DEFAULT_REFERER, ENHANCED_ACCEPT_LANGUAGE, SEC_CH_UA,
    SEC_CH_UA_MOBILE,
};

/// Fixed Chrome-like navigation headers.
pub(crate) struct RequestHeaders;

impl RequestHeaders {
    /// Applies the standard request headers to a `reqwest::RequestBuilder`.
    pub(crate) fn apply_to_request_builder(builder: RequestBuilder) -> RequestBuilder {
        with_fetch_metadata(
            builder
                .header(ACCEPT, BROWSER_ACCEPT)
                .header(ACCEPT_LANGUAGE, BROWSER_ACCEPT_LANGUAGE)
                .header(REFERER, DEFAULT_REFERER)
                .header(CACHE_CONTROL, "max-age=0"),
            "cross-site",
        )
    }
}

/// Per-resolution identity used by the enhanced strategy.
#[derive(Debug, Clone)]
pub(crate) struct BrowserIdentity {
    pub user_agent: String,
    pub referer: String,
}

impl BrowserIdentity {
    pub(crate) fn apply_to_request_builder(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, BROWSER_ACCEPT)
            .header(ACCEPT_LANGUAGE, ENHANCED_ACCEPT_LANGUAGE)
            .header(REFERER, self.referer.as_str())
            .header(HeaderName::from_static("dnt"), "1");
        let builder = with_fetch_metadata(builder, "cross-site");
        if is_chrome(&self.user_agent) {
            builder
                .header(HeaderName::from_static("sec-ch-ua"), SEC_CH_UA)
                .header(HeaderName::from_static("sec-ch-ua-mobile"), SEC_CH_UA_MOBILE)
                .header(
                    HeaderName::from_static("sec-ch-ua-platform"),
                    platform_hint(&self.user_agent),
                )
        } else {
            builder
        }
    }
}

fn with_fetch_metadata(builder: RequestBuilder, site: &'static str) -> RequestBuilder {
    builder
        .header(HeaderName::from_static("sec-fetch-dest"), "document")
        .header(HeaderName::from_static("sec-fetch-mode"), "navigate")
        .header(HeaderName::from_static("sec-fetch-site"), site)
        .header(HeaderName::from_static("sec-fetch-user"), "?1")
        .header(UPGRADE_INSECURE_REQUESTS, "1")
}

/// Chrome (and Chromium-based) agents send client hints; Firefox does not.
pub(crate) fn is_chrome(user_agent: &str) -> bool {
    user_agent.contains("Chrome/") && !user_agent.contains("Firefox/")
}

pub(crate) fn platform_hint(user_agent: &str) -> &'static str {
    if user_agent.contains("Windows") {
        "\"Windows\""
    } else if user_agent.contains("Macintosh") || user_agent.contains("Mac OS X") {
        "\"macOS\""
    } else {
        "\"Linux\""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENTS;

    #[test]
    fn test_chrome_detection() {
        assert!(is_chrome(DEFAULT_USER_AGENTS[0]));
        assert!(is_chrome(DEFAULT_USER_AGENTS[4]));
        assert!(!is_chrome(DEFAULT_USER_AGENTS[2]));
    }

    #[test]
    fn test_platform_hint() {
        assert_eq!(platform_hint(DEFAULT_USER_AGENTS[0]), "\"Windows\"");
        assert_eq!(platform_hint(DEFAULT_USER_AGENTS[1]), "\"macOS\"");
        assert_eq!(platform_hint(DEFAULT_USER_AGENTS[4]), "\"Linux\"");
    }

    #[test]
    fn test_identity_headers_for_chrome() {
        let identity = BrowserIdentity {
            user_agent: DEFAULT_USER_AGENTS[0].to_string(),
            referer: "https://yandex.ru/".to_string(),
        };
        let request = identity
            .apply_to_request_builder(reqwest::Client::new().get("http://example.com/"))
            .build()
            .expect("request builds");
        let headers = request.headers();
        assert_eq!(headers["referer"], "https://yandex.ru/");
        assert_eq!(headers["dnt"], "1");
        assert_eq!(headers["sec-fetch-mode"], "navigate");
        assert!(headers.contains_key("sec-ch-ua"));
    }

    #[test]
    fn test_identity_headers_for_firefox_skip_client_hints() {
        let identity = BrowserIdentity {
            user_agent: DEFAULT_USER_AGENTS[2].to_string(),
            referer: "https://www.bing.com/".to_string(),
        };
        let request = identity
            .apply_to_request_builder(reqwest::Client::new().get("http://example.com/"))
            .build()
            .expect("request builds");
        assert!(!request.headers().contains_key("sec-ch-ua"));
        assert_eq!(request.headers()["user-agent"], DEFAULT_USER_AGENTS[2]);
    }

    #[test]
    fn test_fixed_headers() {
        let request = RequestHeaders::apply_to_request_builder(
            reqwest::Client::new().get("http://example.com/"),
        )
        .build()
        .expect("request builds");
        assert_eq!(request.headers()["accept-language"], BROWSER_ACCEPT_LANGUAGE);
        assert_eq!(request.headers()["upgrade-insecure-requests"], "1");
    }
}
