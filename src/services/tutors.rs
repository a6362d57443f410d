//! Tutor account management.

use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{self, password};
use crate::database::models::identity::{IdentityRow, PatientProfile, Role, TutorProfile};
use crate::error::ApiError;
use crate::services::validate::{check_unique, duplicate_from_db, UniqueField};

#[derive(Debug, Deserialize)]
pub struct CreateTutorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub address: String,
    pub zip_code: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTutorRequest {
    pub name: String,
    pub address: String,
    pub zip_code: String,
}

#[derive(Debug)]
pub struct RegisteredTutor {
    pub tutor: TutorProfile,
    pub token: String,
}

/// Register a tutor: uniqueness check, password hash, insert, token.
///
/// Any duplicate aborts the whole operation; the table's unique
/// constraints catch the concurrent-registration race the check cannot.
pub async fn create(pool: &PgPool, request: CreateTutorRequest) -> Result<RegisteredTutor, ApiError> {
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
        "INSERT INTO identities (name, email, password_hash, phone_number, zip_code, role, address) \
         VALUES ($1, $2, $3, $4, $5, 'Tutor', $6) \
         RETURNING id, name, email, password_hash, phone_number, zip_code, role, \
                   address, delivery_location, tutor_id",
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(&password_hash)
    .bind(&request.phone_number)
    .bind(&request.zip_code)
    .bind(&request.address)
    .fetch_one(pool)
    .await
    .map_err(duplicate_from_db)?;

    let token = auth::issue_token(row.id, Role::Tutor)?;
    let tutor = row.into_identity()?.into_tutor()?;

    Ok(RegisteredTutor { tutor, token })
}

pub async fn list(pool: &PgPool) -> Result<Vec<TutorProfile>, ApiError> {
    let rows: Vec<IdentityRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, phone_number, zip_code, role, \
                address, delivery_location, tutor_id \
         FROM identities WHERE role = 'Tutor' ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| Ok(row.into_identity()?.into_tutor()?))
        .collect()
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<TutorProfile>, ApiError> {
    let row: Option<IdentityRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, phone_number, zip_code, role, \
                address, delivery_location, tutor_id \
         FROM identities WHERE id = $1 AND role = 'Tutor'",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(row.into_identity()?.into_tutor()?)),
        None => Ok(None),
    }
}

/// Update the tutor's mutable fields. Email, phone, password and role are
/// immutable after creation.
pub async fn update(pool: &PgPool, id: i64, request: UpdateTutorRequest) -> Result<bool, ApiError> {
    let result = sqlx::query(
        "UPDATE identities SET name = $1, address = $2, zip_code = $3 \
         WHERE id = $4 AND role = 'Tutor'",
    )
    .bind(&request.name)
    .bind(&request.address)
    .bind(&request.zip_code)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a tutor. The foreign key cascades the delete to their patients.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM identities WHERE id = $1 AND role = 'Tutor'")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Patients under one tutor's care, or `None` when the tutor does not exist.
pub async fn patients_of(pool: &PgPool, tutor_id: i64) -> Result<Option<Vec<PatientProfile>>, ApiError> {
    let tutor_exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM identities WHERE id = $1 AND role = 'Tutor')")
            .bind(tutor_id)
            .fetch_one(pool)
            .await?;
    if !tutor_exists {
        return Ok(None);
    }

    let rows: Vec<IdentityRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, phone_number, zip_code, role, \
                address, delivery_location, tutor_id \
         FROM identities WHERE tutor_id = $1 AND role = 'Patient' ORDER BY id",
    )
    .bind(tutor_id)
    .fetch_all(pool)
    .await?;

    let patients = rows
        .into_iter()
        .map(|row| Ok(row.into_identity()?.into_patient()?))
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Some(patients))
}
