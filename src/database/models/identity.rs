use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// Role assigned at creation. Authoritative for authorization and never
/// reassigned afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Patient,
    Tutor,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "Patient",
            Role::Tutor => "Tutor",
            Role::Employee => "Employee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = IdentityShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(Role::Patient),
            "Tutor" => Ok(Role::Tutor),
            "Employee" => Ok(Role::Employee),
            other => Err(IdentityShapeError::UnknownRole(other.to_string())),
        }
    }
}

/// Raw row of the `identities` table. All three roles live in this one
/// table behind a discriminator, so uniqueness scans see the whole
/// identity space at once.
///
/// The password hash is write-only: produced by hashing, consumed by
/// verification, never serialized into a response.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IdentityRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone_number: String,
    pub zip_code: String,
    pub role: String,
    pub address: Option<String>,
    pub delivery_location: Option<String>,
    pub tutor_id: Option<i64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityShapeError {
    #[error("unknown role tag: {0}")]
    UnknownRole(String),
    #[error("identity {id} with role {role} is missing required column {column}")]
    MissingColumn {
        id: i64,
        role: Role,
        column: &'static str,
    },
    #[error("identity {id} has role {actual}, expected {expected}")]
    RoleMismatch {
        id: i64,
        expected: Role,
        actual: Role,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub zip_code: String,
    pub tutor_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub zip_code: String,
    pub delivery_location: String,
}

/// Domain view of one identity: exactly one role specialization.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role")]
pub enum Identity {
    Tutor(TutorProfile),
    Patient(PatientProfile),
    Employee(EmployeeProfile),
}

impl Identity {
    pub fn id(&self) -> i64 {
        match self {
            Identity::Tutor(t) => t.id,
            Identity::Patient(p) => p.id,
            Identity::Employee(e) => e.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Identity::Tutor(_) => Role::Tutor,
            Identity::Patient(_) => Role::Patient,
            Identity::Employee(_) => Role::Employee,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Identity::Tutor(t) => &t.name,
            Identity::Patient(p) => &p.name,
            Identity::Employee(e) => &e.name,
        }
    }

    fn mismatch(self, expected: Role) -> IdentityShapeError {
        IdentityShapeError::RoleMismatch {
            id: self.id(),
            expected,
            actual: self.role(),
        }
    }

    pub fn into_tutor(self) -> Result<TutorProfile, IdentityShapeError> {
        match self {
            Identity::Tutor(t) => Ok(t),
            other => Err(other.mismatch(Role::Tutor)),
        }
    }

    pub fn into_patient(self) -> Result<PatientProfile, IdentityShapeError> {
        match self {
            Identity::Patient(p) => Ok(p),
            other => Err(other.mismatch(Role::Patient)),
        }
    }

    pub fn into_employee(self) -> Result<EmployeeProfile, IdentityShapeError> {
        match self {
            Identity::Employee(e) => Ok(e),
            other => Err(other.mismatch(Role::Employee)),
        }
    }
}

impl IdentityRow {
    /// Lift the raw row into the role sum type, rejecting rows whose
    /// discriminator disagrees with the populated columns.
    pub fn into_identity(self) -> Result<Identity, IdentityShapeError> {
        let role: Role = self.role.parse()?;
        let missing = |column| IdentityShapeError::MissingColumn {
            id: self.id,
            role,
            column,
        };

        match role {
            Role::Tutor => {
                let address = self.address.ok_or_else(|| missing("address"))?;
                Ok(Identity::Tutor(TutorProfile {
                    id: self.id,
                    name: self.name,
                    email: self.email,
                    phone_number: self.phone_number,
                    address,
                    zip_code: self.zip_code,
                }))
            }
            Role::Patient => {
                let address = self.address.ok_or_else(|| missing("address"))?;
                let tutor_id = self.tutor_id.ok_or_else(|| missing("tutor_id"))?;
                Ok(Identity::Patient(PatientProfile {
                    id: self.id,
                    name: self.name,
                    email: self.email,
                    phone_number: self.phone_number,
                    address,
                    zip_code: self.zip_code,
                    tutor_id,
                }))
            }
            Role::Employee => {
                let delivery_location = self
                    .delivery_location
                    .ok_or_else(|| missing("delivery_location"))?;
                Ok(Identity::Employee(EmployeeProfile {
                    id: self.id,
                    name: self.name,
                    email: self.email,
                    phone_number: self.phone_number,
                    zip_code: self.zip_code,
                    delivery_location,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> IdentityRow {
        IdentityRow {
            id: 1,
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$stub".into(),
            phone_number: "912345678".into(),
            zip_code: "1000-000".into(),
            role: role.into(),
            address: Some("R. A".into()),
            delivery_location: None,
            tutor_id: None,
        }
    }

    #[test]
    fn tutor_row_lifts_to_tutor_variant() {
        let identity = row("Tutor").into_identity().unwrap();
        assert_eq!(identity.role(), Role::Tutor);
        assert_eq!(identity.id(), 1);
    }

    #[test]
    fn patient_row_with_guardian_lifts_to_patient_variant() {
        let mut r = row("Patient");
        r.tutor_id = Some(7);
        let patient = r.into_identity().unwrap().into_patient().unwrap();
        assert_eq!(patient.tutor_id, 7);
        assert_eq!(patient.address, "R. A");
    }

    #[test]
    fn patient_row_without_tutor_id_is_rejected() {
        let err = row("Patient").into_identity().unwrap_err();
        assert_eq!(
            err,
            IdentityShapeError::MissingColumn {
                id: 1,
                role: Role::Patient,
                column: "tutor_id"
            }
        );
    }

    #[test]
    fn unknown_role_tag_is_rejected() {
        let err = row("Admin").into_identity().unwrap_err();
        assert_eq!(err, IdentityShapeError::UnknownRole("Admin".into()));
    }

    #[test]
    fn password_hash_never_serializes() {
        let json = serde_json::to_value(row("Tutor")).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn role_round_trips_through_its_string_form() {
        for role in [Role::Patient, Role::Tutor, Role::Employee] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }
}
