//! Session-token issuance and validation.
//!
//! Tokens are stateless HS256 JWTs carrying `(user id, role)`. While the
//! signature is intact and the token unexpired, it attests to those claims
//! as of issuance time - no database round-trip is needed to validate.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::database::models::identity::Role;

pub mod password;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token attests to.
    pub sub: i64,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, role: Role) -> Self {
        let now = Utc::now();
        let security = &config::config().security;
        let exp = (now + Duration::minutes(security.token_expiry_minutes)).timestamp();

        Self {
            sub: user_id,
            role,
            iss: security.jwt_issuer.clone(),
            aud: security.jwt_audience.clone(),
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,
    #[error("token could not be generated: {0}")]
    Generation(String),
    #[error("token is malformed")]
    Malformed,
    #[error("token signature or claims are invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

/// Issue a signed session token for the given identity.
pub fn issue_token(user_id: i64, role: Role) -> Result<String, TokenError> {
    encode_claims(&Claims::new(user_id, role))
}

pub fn encode_claims(claims: &Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &key).map_err(|e| TokenError::Generation(e.to_string()))
}

/// Verify signature, issuer, audience and expiry; classify any failure.
///
/// Never panics or propagates library errors for user-supplied input.
pub fn decode_token(token: &str) -> Result<Claims, TokenError> {
    let security = &config::config().security;
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_issuer(&[&security.jwt_issuer]);
    validation.set_audience(&[&security.jwt_audience]);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_round_trips_to_same_claims() {
        let token = issue_token(42, Role::Tutor).unwrap();
        let claims = decode_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Tutor);
    }

    #[test]
    fn two_logins_issue_independent_tokens_for_same_identity() {
        let mut first = Claims::new(7, Role::Patient);
        // Force distinct payloads; in practice iat differs between calls
        first.iat -= 1;
        let a = encode_claims(&first).unwrap();
        let b = issue_token(7, Role::Patient).unwrap();
        assert_ne!(a, b);
        assert_eq!(decode_token(&a).unwrap().sub, decode_token(&b).unwrap().sub);
    }

    #[test]
    fn expiry_window_is_configured_minutes() {
        let claims = Claims::new(1, Role::Employee);
        let window = claims.exp - claims.iat;
        assert_eq!(window, crate::config::config().security.token_expiry_minutes * 60);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let mut claims = Claims::new(5, Role::Tutor);
        // Well past the default validation leeway
        claims.exp = (Utc::now() - Duration::minutes(10)).timestamp();
        let token = encode_claims(&claims).unwrap();
        assert_eq!(decode_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = issue_token(9, Role::Employee).unwrap();
        // Flip a character in the signature segment
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        let outcome = decode_token(&tampered);
        assert!(matches!(
            outcome,
            Err(TokenError::InvalidSignature) | Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert_eq!(decode_token("not-a-token"), Err(TokenError::Malformed));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let mut claims = Claims::new(3, Role::Patient);
        claims.aud = "some-other-service".to_string();
        let token = encode_claims(&claims).unwrap();
        assert_eq!(decode_token(&token), Err(TokenError::InvalidSignature));
    }
}
