//! Credential verification and session establishment.

use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::{self, password};
use crate::database::models::identity::{IdentityRow, Role};
use crate::error::ApiError;

/// Verified against on the unknown-email path so both login failures pay
/// one argon2 verification and cannot be told apart by response timing.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| password::hash("caredesk-timing-pad").unwrap_or_default());

/// Minimal public session payload: safe for client display, never carries
/// the password hash or any other credential material.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub token: String,
}

/// Authenticate by exact email match and password verification.
///
/// Unknown email and wrong password collapse into the same `None` outcome
/// so the response cannot be used to enumerate accounts.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password_plain: &str,
) -> Result<Option<AuthSession>, ApiError> {
    let row: Option<IdentityRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, phone_number, zip_code, role, \
                address, delivery_location, tutor_id \
         FROM identities WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        let _ = password::verify(password_plain, &DUMMY_HASH);
        return Ok(None);
    };

    if !password::verify(password_plain, &row.password_hash) {
        return Ok(None);
    }

    let role: Role = row.role.parse()?;
    let token = auth::issue_token(row.id, role)?;

    Ok(Some(AuthSession {
        name: row.name,
        role,
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_pad_is_a_real_verifiable_hash() {
        // A malformed pad would short-circuit at parse time and reopen the
        // timing difference between unknown-email and wrong-password
        assert!(DUMMY_HASH.starts_with("$argon2id$"));
        assert!(!password::verify("some-login-attempt", &DUMMY_HASH));
    }
}
