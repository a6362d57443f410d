use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use sqlx::PgPool;

use super::{envelope, session_cookie};
use crate::database::models::identity::Role;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::patients::{self, CreatePatientRequest, UpdatePatientRequest};

/// POST /api/patients - public registration under an existing guardian tutor
pub async fn register(
    State(pool): State<PgPool>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let registered = patients::create(&pool, request).await?;

    let body = envelope(
        "Patient registered",
        json!({
            "patient": registered.patient,
            "token": registered.token,
        }),
    );

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&registered.token))],
        Json(body),
    ))
}

/// GET /api/patients
pub async fn list(_user: AuthUser, State(pool): State<PgPool>) -> Result<impl IntoResponse, ApiError> {
    let all = patients::list(&pool).await?;
    Ok(Json(envelope("Patients found", all)))
}

/// GET /api/patients/:id
pub async fn get_by_id(
    _user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = patients::get(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("No patient exists with that id"))?;
    Ok(Json(envelope("Patient found", patient)))
}

/// PUT /api/patients/:id - guardians manage their patients' details
pub async fn update(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_role(Role::Tutor)?;

    if !patients::update(&pool, id, request).await? {
        return Err(ApiError::not_found("No patient exists with that id"));
    }
    Ok(Json(envelope("Patient updated", json!(null))))
}

/// DELETE /api/patients/:id
pub async fn delete(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_role(Role::Tutor)?;

    if !patients::delete(&pool, id).await? {
        return Err(ApiError::not_found("No patient exists with that id"));
    }
    Ok(Json(envelope("Patient deleted", json!(null))))
}
