//! Per-request authentication pipeline.
//!
//! Extracts the session token from either transport (bearer header first,
//! `access_token` cookie as the fallback), validates it, and resolves the
//! identity context before any handler body runs. Any non-valid outcome
//! ends the request with 401; no partial processing occurs.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::auth::{decode_token, TokenError};
use crate::database::models::identity::Role;
use crate::error::ApiError;

/// Name of the cookie carrying the session token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Which transport supplied the token. Reported explicitly rather than
/// folded into the extraction, so tests and logs can see which path won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    BearerHeader,
    Cookie,
}

/// Authenticated identity context resolved from a validated session token.
///
/// This pair is the only request-derived information the rest of the
/// system may trust for authorization decisions. Present as a handler
/// argument, it means the request was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    /// Role check layered on top of authentication. A mismatch is a 403,
    /// distinct from the 401 the pipeline itself produces.
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "This operation requires the {} role",
                role
            )))
        }
    }
}

/// Locate the session token: `Authorization: Bearer` wins, the cookie is
/// the fallback. A malformed or empty header counts as absent.
pub fn extract_token(headers: &HeaderMap) -> Option<(String, TokenSource)> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some((token.to_string(), TokenSource::BearerHeader));
            }
        }
    }

    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookies) = cookie_header.to_str() else {
            continue;
        };
        for pair in cookies.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == ACCESS_TOKEN_COOKIE && !value.is_empty() {
                    return Some((value.to_string(), TokenSource::Cookie));
                }
            }
        }
    }

    None
}

/// Run the full pipeline against a set of request headers.
pub fn authenticate_request(headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let (token, source) =
        extract_token(headers).ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let claims = decode_token(&token).map_err(|e| match e {
        TokenError::Expired => ApiError::unauthorized("Session has expired"),
        _ => ApiError::unauthorized("Invalid authentication token"),
    })?;

    tracing::debug!(user_id = claims.sub, ?source, "request authenticated");

    Ok(AuthUser {
        id: claims.sub,
        role: claims.role,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate_request(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(entries: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer header-token"),
            (header::COOKIE, "access_token=cookie-token"),
        ]);
        let (token, source) = extract_token(&map).unwrap();
        assert_eq!(token, "header-token");
        assert_eq!(source, TokenSource::BearerHeader);
    }

    #[test]
    fn cookie_is_used_when_header_is_absent() {
        let map = headers(&[(header::COOKIE, "theme=dark; access_token=cookie-token; lang=pt")]);
        let (token, source) = extract_token(&map).unwrap();
        assert_eq!(token, "cookie-token");
        assert_eq!(source, TokenSource::Cookie);
    }

    #[test]
    fn malformed_authorization_header_falls_back_to_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "access_token=cookie-token"),
        ]);
        let (token, source) = extract_token(&map).unwrap();
        assert_eq!(token, "cookie-token");
        assert_eq!(source, TokenSource::Cookie);
    }

    #[test]
    fn empty_bearer_token_counts_as_absent() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer ")]);
        assert_eq!(extract_token(&map), None);
    }

    #[test]
    fn no_credential_yields_none() {
        let map = headers(&[(header::COOKIE, "theme=dark")]);
        assert_eq!(extract_token(&map), None);
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[test]
    fn both_transports_resolve_the_same_identity() {
        let token = crate::auth::issue_token(11, Role::Patient).unwrap();

        let bearer = format!("Bearer {}", token);
        let cookie = format!("access_token={}", token);
        let via_header =
            authenticate_request(&headers(&[(header::AUTHORIZATION, bearer.as_str())])).unwrap();
        let via_cookie =
            authenticate_request(&headers(&[(header::COOKIE, cookie.as_str())])).unwrap();

        assert_eq!(via_header, via_cookie);
        assert_eq!(via_header.id, 11);
        assert_eq!(via_header.role, Role::Patient);
    }

    #[test]
    fn absent_and_invalid_tokens_are_both_unauthorized() {
        let missing = authenticate_request(&HeaderMap::new()).unwrap_err();
        assert_eq!(missing.status_code(), axum::http::StatusCode::UNAUTHORIZED);

        let garbage = authenticate_request(&headers(&[(header::AUTHORIZATION, "Bearer junk")]))
            .unwrap_err();
        assert_eq!(garbage.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn require_role_distinguishes_authorization_from_authentication() {
        let user = AuthUser {
            id: 1,
            role: Role::Tutor,
        };
        assert!(user.require_role(Role::Tutor).is_ok());

        let err = user.require_role(Role::Employee).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }
}
