use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::config;
use crate::middleware::ACCESS_TOKEN_COOKIE;

pub mod employees;
pub mod patients;
pub mod tutors;
pub mod users;

/// Shared success envelope: `{success, message, data}`.
pub(crate) fn envelope<T: Serialize>(message: &str, data: T) -> Value {
    json!({
        "success": true,
        "message": message,
        "data": data,
    })
}

/// Session cookie for browser clients: http-only so scripts cannot read
/// it, SameSite=None + Secure so the separate frontend origin can send it.
/// Lifetime matches the token's expiry window.
pub(crate) fn session_cookie(token: &str) -> String {
    let max_age_secs = config::config().security.token_expiry_minutes * 60;
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; Secure; SameSite=None",
        ACCESS_TOKEN_COOKIE, token, max_age_secs
    )
}

/// GET /health - liveness plus a store ping
pub async fn health(State(pool): State<PgPool>) -> impl IntoResponse {
    match crate::database::health_check(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "healthy" })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "message": "database unavailable" })),
            )
        }
    }
}
