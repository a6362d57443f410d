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
use crate::services::employees::{self, CreateEmployeeRequest, UpdateEmployeeRequest};

/// POST /api/employees - public registration
pub async fn register(
    State(pool): State<PgPool>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let registered = employees::create(&pool, request).await?;

    let body = envelope(
        "Employee registered",
        json!({
            "employee": registered.employee,
            "token": registered.token,
        }),
    );

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&registered.token))],
        Json(body),
    ))
}

/// GET /api/employees
pub async fn list(_user: AuthUser, State(pool): State<PgPool>) -> Result<impl IntoResponse, ApiError> {
    let all = employees::list(&pool).await?;
    Ok(Json(envelope("Employees found", all)))
}

/// GET /api/employees/:id
pub async fn get_by_id(
    _user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let employee = employees::get(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("No employee exists with that id"))?;
    Ok(Json(envelope("Employee found", employee)))
}

/// PUT /api/employees/:id
pub async fn update(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_role(Role::Employee)?;

    if !employees::update(&pool, id, request).await? {
        return Err(ApiError::not_found("No employee exists with that id"));
    }
    Ok(Json(envelope("Employee updated", json!(null))))
}

/// DELETE /api/employees/:id
pub async fn delete(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_role(Role::Employee)?;

    if !employees::delete(&pool, id).await? {
        return Err(ApiError::not_found("No employee exists with that id"));
    }
    Ok(Json(envelope("Employee deleted", json!(null))))
}
