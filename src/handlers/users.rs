use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{envelope, session_cookie};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::users;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// GET /api/users/me - echo the authenticated identity context
pub async fn me(user: AuthUser) -> impl IntoResponse {
    Json(envelope(
        "Authenticated",
        json!({
            "id": user.id,
            "role": user.role,
        }),
    ))
}

/// POST /api/users/login
///
/// One generic failure for unknown email and wrong password; the response
/// must not reveal which credential was wrong.
pub async fn login(
    State(pool): State<PgPool>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = users::authenticate(&pool, &request.email, &request.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let body = envelope(
        "Authentication successful",
        json!({
            "name": session.name,
            "role": session.role,
            "token": session.token,
        }),
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&session.token))],
        Json(body),
    ))
}
