//! Token extraction from request headers.

use axum::http::{header, HeaderMap};

/// Header carrying a raw API key when no `Authorization` header is sent.
pub const APIKEY_HEADER: &str = "apikey";

/// Pull the bearer token out of `Authorization`, falling back to `apikey`.
///
/// A leading `Bearer ` is stripped; any other value is used as-is. An empty
/// result falls through to the `apikey` header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
        .filter(|v| !v.is_empty());

    from_auth
        .or_else(|| {
            headers
                .get(APIKEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_bearer_prefix_stripped() {
        let h = headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&h).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_authorization_without_scheme() {
        let h = headers(&[("authorization", "raw-token")]);
        assert_eq!(extract_token(&h).as_deref(), Some("raw-token"));
    }

    #[test]
    fn test_apikey_fallback() {
        let h = headers(&[("apikey", "anon-key")]);
        assert_eq!(extract_token(&h).as_deref(), Some("anon-key"));

        let h = headers(&[("authorization", "Bearer "), ("apikey", "anon-key")]);
        assert_eq!(extract_token(&h).as_deref(), Some("anon-key"));
    }

    #[test]
    fn test_authorization_wins_over_apikey() {
        let h = headers(&[("authorization", "Bearer jwt"), ("apikey", "anon-key")]);
        assert_eq!(extract_token(&h).as_deref(), Some("jwt"));
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        assert_eq!(extract_token(&headers(&[("apikey", "")])), None);
    }
}
