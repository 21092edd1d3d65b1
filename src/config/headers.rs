//! Browser-like request header values.
//!
//! Shared by the HTTP strategies so every request carries a consistent
//! browser fingerprint.

/// Accept header sent by current Chrome for top-level navigations
pub const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
/// Accept-Language used by the enhanced strategy (regional sites)
pub const ENHANCED_ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";
/// Referer used by the plain strategy
pub const DEFAULT_REFERER: &str = "https://www.google.com/";

/// Referers the enhanced strategy picks from at random.
pub const REFERER_POOL: &[&str] = &[
    "https://www.google.com/",
    "https://www.google.ru/",
    "https://yandex.ru/",
    "https://www.bing.com/",
    "https://duckduckgo.com/",
];

// Client hints, only sent alongside a Chrome User-Agent
pub const SEC_CH_UA: &str =
    "\"Google Chrome\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"";
pub const SEC_CH_UA_MOBILE: &str = "?0";
