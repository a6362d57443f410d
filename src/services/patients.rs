//! Patient account management.
//!
//! A patient always belongs to a guardian tutor; creation is rejected
//! outright when the referenced tutor does not exist.

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{self, password};
use crate::database::models::identity::{IdentityRow, PatientProfile, Role};
use crate::error::ApiError;
use crate::services::validate::{check_unique, duplicate_from_db, UniqueField};

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub address: String,
    pub zip_code: String,
    pub tutor_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePatientRequest {
    pub name: String,
    pub address: String,
    pub zip_code: String,
}

#[derive(Debug)]
pub struct RegisteredPatient {
    pub patient: PatientProfile,
    pub token: String,
}

/// Guardian lookup seam over the identity store.
#[async_trait]
pub trait GuardianDirectory {
    async fn tutor_exists(&self, id: i64) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl GuardianDirectory for PgPool {
    async fn tutor_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM identities WHERE id = $1 AND role = 'Tutor')",
        )
        .bind(id)
        .fetch_one(self)
        .await
    }
}

/// Reject with not-found when the referenced guardian does not exist.
pub async fn ensure_guardian<G>(directory: &G, tutor_id: i64) -> Result<(), ApiError>
where
    G: GuardianDirectory + Sync,
{
    if directory.tutor_exists(tutor_id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("No tutor exists with that id"))
    }
}

/// Register a patient under an existing guardian tutor.
///
/// Order matters: the guardian check runs first so a missing tutor is a
/// not-found outcome rather than being mixed into duplicate violations,
/// and nothing is written on either rejection.
pub async fn create(
    pool: &PgPool,
    request: CreatePatientRequest,
) -> Result<RegisteredPatient, ApiError> {
    ensure_guardian(pool, request.tutor_id).await?;

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
             (name, email, password_hash, phone_number, zip_code, role, address, tutor_id) \
         VALUES ($1, $2, $3, $4, $5, 'Patient', $6, $7) \
         RETURNING id, name, email, password_hash, phone_number, zip_code, role, \
                   address, delivery_location, tutor_id",
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(&password_hash)
    .bind(&request.phone_number)
    .bind(&request.zip_code)
    .bind(&request.address)
    .bind(request.tutor_id)
    .fetch_one(pool)
    .await
    .map_err(duplicate_from_db)?;

    let token = auth::issue_token(row.id, Role::Patient)?;
    let patient = row.into_identity()?.into_patient()?;

    Ok(RegisteredPatient { patient, token })
}

pub async fn list(pool: &PgPool) -> Result<Vec<PatientProfile>, ApiError> {
    let rows: Vec<IdentityRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, phone_number, zip_code, role, \
                address, delivery_location, tutor_id \
         FROM identities WHERE role = 'Patient' ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| Ok(row.into_identity()?.into_patient()?))
        .collect()
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<PatientProfile>, ApiError> {
    let row: Option<IdentityRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, phone_number, zip_code, role, \
                address, delivery_location, tutor_id \
         FROM identities WHERE id = $1 AND role = 'Patient'",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(row.into_identity()?.into_patient()?)),
        None => Ok(None),
    }
}

/// Update the patient's mutable fields. The guardian link, email, phone,
/// password and role are immutable after creation.
pub async fn update(pool: &PgPool, id: i64, request: UpdatePatientRequest) -> Result<bool, ApiError> {
    let result = sqlx::query(
        "UPDATE identities SET name = $1, address = $2, zip_code = $3 \
         WHERE id = $4 AND role = 'Patient'",
    )
    .bind(&request.name)
    .bind(&request.address)
    .bind(&request.zip_code)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM identities WHERE id = $1 AND role = 'Patient'")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::collections::HashSet;

    /// In-memory guardian directory mirroring the role-filtered lookup of
    /// the Postgres implementation.
    struct MemoryDirectory {
        tutors: HashSet<i64>,
    }

    #[async_trait]
    impl GuardianDirectory for MemoryDirectory {
        async fn tutor_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
            Ok(self.tutors.contains(&id))
        }
    }

    #[tokio::test]
    async fn missing_guardian_is_rejected_as_not_found() {
        // Creation bails on this error before any row is written
        let directory = MemoryDirectory {
            tutors: HashSet::from([1]),
        };
        let err = ensure_guardian(&directory, 999).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.message().contains("tutor"));
    }

    #[tokio::test]
    async fn existing_guardian_is_accepted() {
        let directory = MemoryDirectory {
            tutors: HashSet::from([1]),
        };
        assert!(ensure_guardian(&directory, 1).await.is_ok());
    }
}
