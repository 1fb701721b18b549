//! Session authorization guard.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

use crate::token::{Claims, TokenError};
use crate::{AppState, ServerError};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Why a request could not be authenticated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("expired token")]
    ExpiredToken,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Malformed => AuthError::InvalidToken,
        }
    }
}

/// Authenticated identity, decoded from the session cookie.
///
/// Extracting it verifies the token; it never rejects the request on its
/// own, the handler signature decides which routes require it.
#[derive(Clone, Debug)]
pub struct Identity(pub Claims);

impl FromRequestParts<AppState> for Identity {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            session_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = state.token.decode(token).map_err(AuthError::from)?;

        Ok(Identity(claims))
    }
}

/// Extract the session token from the `Cookie` header.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('=')
        })
}

/// Session cookie carrying `token`, scoped for cross-site usage.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; Secure; SameSite=None")
}

/// Emptied session cookie, expiring immediately.
pub fn clear_session_cookie() -> String {
    format!(
        "{SESSION_COOKIE}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0"
    )
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_session_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("token=abc"));
        assert_eq!(session_token(&headers), Some("abc"));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def; lang=en"),
        );
        assert_eq!(session_token(&headers), Some("abc.def"));

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("abc");
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Secure"));

        let cleared = clear_session_cookie();
        assert!(cleared.starts_with("token=;"));
        assert!(cleared.contains("Max-Age=0"));
    }
}
