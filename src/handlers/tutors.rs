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
use crate::services::tutors::{self, CreateTutorRequest, UpdateTutorRequest};

/// POST /api/tutors - public registration
pub async fn register(
    State(pool): State<PgPool>,
    Json(request): Json<CreateTutorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let registered = tutors::create(&pool, request).await?;

    let body = envelope(
        "Tutor registered",
        json!({
            "tutor": registered.tutor,
            "token": registered.token,
        }),
    );

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&registered.token))],
        Json(body),
    ))
}

/// GET /api/tutors
pub async fn list(_user: AuthUser, State(pool): State<PgPool>) -> Result<impl IntoResponse, ApiError> {
    let all = tutors::list(&pool).await?;
    Ok(Json(envelope("Tutors found", all)))
}

/// GET /api/tutors/:id
pub async fn get_by_id(
    _user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let tutor = tutors::get(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("No tutor exists with that id"))?;
    Ok(Json(envelope("Tutor found", tutor)))
}

/// GET /api/tutors/:id/patients
pub async fn patients_of(
    _user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let patients = tutors::patients_of(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("No tutor exists with that id"))?;
    Ok(Json(envelope("Patients found", patients)))
}

/// PUT /api/tutors/:id - mutable fields only
pub async fn update(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTutorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_role(Role::Tutor)?;

    if !tutors::update(&pool, id, request).await? {
        return Err(ApiError::not_found("No tutor exists with that id"));
    }
    Ok(Json(envelope("Tutor updated", json!(null))))
}

/// DELETE /api/tutors/:id - cascades to the tutor's patients
pub async fn delete(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_role(Role::Tutor)?;

    if !tutors::delete(&pool, id).await? {
        return Err(ApiError::not_found("No tutor exists with that id"));
    }
    Ok(Json(envelope("Tutor deleted", json!(null))))
}
