use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::verifier::JwtVerifier;

/// Extracts verified JWT claims from the request using the configured verifier.
///
/// Handlers that allow anonymous callers take `Option<AuthContext>`; any
/// rejection then collapses to `None`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<JwtVerifier>::from_ref(state);
        let token = bearer_from_headers(&parts.headers)?;
        let claims = verifier.verify(&token)?;

        Ok(Self { claims })
    }
}

/// Pulls the bearer token out of the `Authorization` header.
pub fn bearer_from_headers(headers: &HeaderMap) -> AuthResult<String> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;
    let raw = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?;
    parse_bearer(raw)
}

/// Accepts `Bearer <token>` and also a bare token, which is how websocket
/// clients usually forward it in the connection payload.
pub fn parse_bearer(raw: &str) -> AuthResult<String> {
    let raw = raw.trim_start();
    let token = match raw.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ if raw.trim_end().contains(char::is_whitespace) => {
            return Err(AuthError::InvalidAuthorization)
        }
        _ => raw.trim_end(),
    };

    if token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }

    Ok(token.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parse_bearer_accepts_valid_token() {
        let token = parse_bearer("Bearer abc.def.ghi").expect("token");
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn parse_bearer_accepts_bare_token() {
        let token = parse_bearer("abc.def.ghi").expect("token");
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn parse_bearer_rejects_wrong_scheme() {
        let err = parse_bearer("Basic credentials").expect_err("should reject");
        assert!(matches!(err, AuthError::InvalidAuthorization));
    }

    #[test]
    fn parse_bearer_rejects_empty_value() {
        let err = parse_bearer("Bearer    ").expect_err("should reject empty token");
        assert!(matches!(err, AuthError::InvalidAuthorization));
        let err = parse_bearer("Bearer").expect_err("should reject bare scheme");
        assert!(matches!(err, AuthError::InvalidAuthorization));
    }

    #[test]
    fn parse_bearer_keeps_tokens_that_start_like_the_scheme() {
        assert_eq!(parse_bearer("Bearerish.tok").expect("token"), "Bearerish.tok");
        assert_eq!(parse_bearer("  Bearer  abc  ").expect("token"), "abc");
    }

    #[test]
    fn missing_header_is_reported() {
        let headers = HeaderMap::new();
        let err = bearer_from_headers(&headers).expect_err("missing");
        assert!(matches!(err, AuthError::MissingAuthorization));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer t0k3n"));
        assert_eq!(bearer_from_headers(&headers).expect("token"), "t0k3n");
    }
}
