//! Seed URL validation and normalization.

use crate::config::MAX_URL_LENGTH;

/// Why a seed was rejected before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedRejection {
    Empty,
    TooLong(usize),
    Unparseable,
    UnsupportedScheme(String),
}

impl std::fmt::Display for SeedRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedRejection::Empty => f.write_str("empty URL"),
            SeedRejection::TooLong(len) => {
                write!(f, "URL longer than {MAX_URL_LENGTH} characters ({len})")
            }
            SeedRejection::Unparseable => f.write_str("unparseable URL"),
            SeedRejection::UnsupportedScheme(scheme) => write!(f, "unsupported scheme '{scheme}'"),
        }
    }
}

/// Prepends `https://` to bare hosts and checks the result parses as an
/// http(s) URL no longer than `MAX_URL_LENGTH`.
pub fn normalize_seed_url(raw: &str) -> Result<String, SeedRejection> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SeedRejection::Empty);
    }

    let lower = raw.to_ascii_lowercase();
    let normalized = if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else if let Some((scheme, _)) = raw.split_once("://") {
        return Err(SeedRejection::UnsupportedScheme(scheme.to_string()));
    } else {
        format!("https://{raw}")
    };

    if normalized.len() > MAX_URL_LENGTH {
        return Err(SeedRejection::TooLong(normalized.len()));
    }

    match url::Url::parse(&normalized) {
        Ok(parsed) if parsed.host().is_some() => Ok(normalized),
        Ok(_) | Err(_) => Err(SeedRejection::Unparseable),
    }
}
