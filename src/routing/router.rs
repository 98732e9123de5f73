//! Function name lookup from request paths.

use url::Url;

/// Path answered by the gateway itself.
pub const HEALTH_PATH: &str = "/health";

/// Base the request path is resolved against; only its path survives.
const BASE: &str = "http://gateway";

/// The request path as a URL parser sees it: dot segments resolved,
/// `%2e` treated as a dot.
///
/// Falls back to the raw path if it does not parse.
pub fn normalize_path(path: &str) -> String {
    match Url::parse(&format!("{BASE}{path}")) {
        Ok(url) => url.path().to_string(),
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "Unparsable request path");
            path.to_string()
        }
    }
}

/// Function name for a normalized path: its last non-empty segment.
///
/// Segments are compared verbatim (no percent-decoding, case-sensitive).
pub fn route_of_path(path: &str) -> Option<&str> {
    path.rsplit('/').find(|segment| !segment.is_empty())
}
