use crate::error::VerdantError;
use axum::http::{header, request::Parts};
use cookie::Cookie;

/// Pulls the access token out of an incoming request
pub struct TokenExtractor;

impl TokenExtractor {
    /// Bearer header first, then the session cookie.
    pub fn from_request(parts: &Parts, cookie_name: &str) -> Result<String, VerdantError> {
        if parts.headers.contains_key(header::AUTHORIZATION) {
            return Self::from_header(parts);
        }

        Self::from_cookie(parts, cookie_name)
            .map_err(|_| VerdantError::unauthorized("Missing credentials"))
    }

    /// `Authorization: Bearer <token>`
    pub fn from_header(parts: &Parts) -> Result<String, VerdantError> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| VerdantError::unauthorized("Missing authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            VerdantError::unauthorized(
                "Invalid authorization header format. Expected: Bearer <token>",
            )
        })?;

        let token = token.trim();
        if token.is_empty() {
            return Err(VerdantError::unauthorized("Empty bearer token"));
        }

        Ok(token.to_string())
    }

    pub fn from_cookie(parts: &Parts, cookie_name: &str) -> Result<String, VerdantError> {
        parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value))
            .filter_map(|cookie| cookie.ok())
            .find(|cookie| cookie.name() == cookie_name && !cookie.value().is_empty())
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| VerdantError::unauthorized(format!("Cookie '{}' not found", cookie_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_extract_from_valid_bearer_header() {
        let parts = parts(Request::builder().header("authorization", "Bearer abc.def.ghi"));
        assert_eq!(TokenExtractor::from_header(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_rejects_other_schemes() {
        let parts = parts(Request::builder().header("authorization", "Basic credentials"));
        assert!(TokenExtractor::from_header(&parts).is_err());
    }

    #[test]
    fn test_extract_from_cookie() {
        let parts = parts(
            Request::builder().header("cookie", "theme=dark; verdant_session=tok123; other=1"),
        );
        assert_eq!(
            TokenExtractor::from_cookie(&parts, "verdant_session").unwrap(),
            "tok123"
        );
        assert_eq!(
            TokenExtractor::from_request(&parts, "verdant_session").unwrap(),
            "tok123"
        );
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let parts = parts(
            Request::builder()
                .header("authorization", "Bearer from-header")
                .header("cookie", "verdant_session=from-cookie"),
        );
        assert_eq!(
            TokenExtractor::from_request(&parts, "verdant_session").unwrap(),
            "from-header"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let parts = parts(Request::builder());
        let err = TokenExtractor::from_request(&parts, "verdant_session").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
