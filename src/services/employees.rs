//! Employee account management.

use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{self, password};
use crate::database::models::identity::{EmployeeProfile, IdentityRow, Role};
use crate::error::ApiError;
use crate::services::validate::{check_unique, duplicate_from_db, UniqueField};

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub zip_code: String,
    pub delivery_location: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: String,
    pub zip_code: String,
    pub delivery_location: String,
}

#[derive(Debug)]
pub struct RegisteredEmployee {
    pub employee: EmployeeProfile,
    pub token: String,
}

pub async fn create(
    pool: &PgPool,
    request: CreateEmployeeRequest,
) -> Result<RegisteredEmployee, ApiError> {
    let violations = check_unique(
        pool,
        &[
            (UniqueField::Email, &request.email),
            (UniqueField::PhoneNumber, &request.phone_number),
        ],
    )
    .await?;
    if !violations.is_empty() {
        return Err(ApiError::duplicate(violations));
    }

    let password_hash = password::hash(&request.password)?;

    let row: IdentityRow = sqlx::query_as(
        "INSERT INTO identities \
             (name, email, password_hash, phone_number, zip_code, role, delivery_location) \
         VALUES ($1, $2, $3, $4, $5, 'Employee', $6) \
         RETURNING id, name, email, password_hash, phone_number, zip_code, role, \
                   address, delivery_location, tutor_id",
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(&password_hash)
    .bind(&request.phone_number)
    .bind(&request.zip_code)
    .bind(&request.delivery_location)
    .fetch_one(pool)
    .await
    .map_err(duplicate_from_db)?;

    let token = auth::issue_token(row.id, Role::Employee)?;
    let employee = row.into_identity()?.into_employee()?;

    Ok(RegisteredEmployee { employee, token })
}

pub async fn list(pool: &PgPool) -> Result<Vec<EmployeeProfile>, ApiError> {
    let rows: Vec<IdentityRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, phone_number, zip_code, role, \
                address, delivery_location, tutor_id \
         FROM identities WHERE role = 'Employee' ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| Ok(row.into_identity()?.into_employee()?))
        .collect()
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<EmployeeProfile>, ApiError> {
    let row: Option<IdentityRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, phone_number, zip_code, role, \
                address, delivery_location, tutor_id \
         FROM identities WHERE id = $1 AND role = 'Employee'",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(row.into_identity()?.into_employee()?)),
        None => Ok(None),
    }
}

pub async fn update(pool: &PgPool, id: i64, request: UpdateEmployeeRequest) -> Result<bool, ApiError> {
    let result = sqlx::query(
        "UPDATE identities SET name = $1, zip_code = $2, delivery_location = $3 \
         WHERE id = $4 AND role = 'Employee'",
    )
    .bind(&request.name)
    .bind(&request.zip_code)
    .bind(&request.delivery_location)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM identities WHERE id = $1 AND role = 'Employee'")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
