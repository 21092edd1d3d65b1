//! `Location` header resolution.

use log::warn;
use url::Url;

/// Resolves a `Location` header value against the URL that returned it.
///
/// Absolute `http(s)://` locations pass through untouched. Absolute paths
/// keep the base's scheme, host and port; everything else follows standard
/// relative-reference rules. A location that cannot be resolved is returned
/// as-is so the chain degrades to "treat as final" instead of aborting.
pub fn resolve_location(base_url: &str, location: &str) -> String {
    let location = location.trim();
    if has_http_scheme(location) {
        return location.to_string();
    }

    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            warn!("Cannot parse base URL {base_url} for Location {location}: {e}");
            return location.to_string();
        }
    };

    if location.starts_with('/') && !location.starts_with("//") {
        if let Some(host) = base.host_str() {
            let port = base.port().map(|p| format!(":{p}")).unwrap_or_default();
            return format!("{}://{}{}{}", base.scheme(), host, port, location);
        }
    }

    match base.join(location) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            warn!("Cannot resolve Location {location} against {base_url}: {e}");
            location.to_string()
        }
    }
}

fn has_http_scheme(location: &str) -> bool {
    let lower = location.get(..8).unwrap_or(location).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
