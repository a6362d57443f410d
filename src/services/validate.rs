//! Cross-role uniqueness validation.
//!
//! Three registration flows (tutor, patient, employee) fold into the same
//! identity space, so they share one validator instead of three bespoke
//! checks. Rules are statically typed; every violation is accumulated so a
//! client can fix all of them in one round trip.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{ApiError, FieldViolation};

/// Fields that must be unique across the entire identity space,
/// regardless of role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    PhoneNumber,
}

impl UniqueField {
    pub fn field_name(&self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::PhoneNumber => "phone_number",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::PhoneNumber => "phone number",
        }
    }

    pub fn violation(&self) -> FieldViolation {
        FieldViolation::new(
            self.field_name(),
            format!("A user with that {} already exists.", self.label()),
        )
    }
}

/// Lookup seam over the identity store. The production implementation
/// scans the whole `identities` table, never a single role's slice.
#[async_trait]
pub trait IdentityIndex {
    async fn value_exists(&self, field: UniqueField, value: &str) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl IdentityIndex for PgPool {
    async fn value_exists(&self, field: UniqueField, value: &str) -> Result<bool, sqlx::Error> {
        let sql = match field {
            UniqueField::Email => "SELECT EXISTS (SELECT 1 FROM identities WHERE email = $1)",
            UniqueField::PhoneNumber => {
                "SELECT EXISTS (SELECT 1 FROM identities WHERE phone_number = $1)"
            }
        };
        sqlx::query_scalar(sql).bind(value).fetch_one(self).await
    }
}

/// Check every supplied rule, accumulating all violations found.
///
/// An empty list means safe to proceed; a non-empty list must abort the
/// entire write with no partial state.
pub async fn check_unique<I>(
    index: &I,
    rules: &[(UniqueField, &str)],
) -> Result<Vec<FieldViolation>, sqlx::Error>
where
    I: IdentityIndex + Sync,
{
    let mut violations = Vec::new();
    for (field, value) in rules {
        if index.value_exists(*field, value).await? {
            violations.push(field.violation());
        }
    }
    Ok(violations)
}

/// Map a database unique-constraint rejection back into the same
/// field-violation shape the pre-insert check produces.
///
/// The constraints are the backstop for the race between two concurrent
/// registrations that both pass `check_unique`.
pub fn duplicate_from_db(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("identities_email_key") => Some(UniqueField::Email),
                Some("identities_phone_number_key") => Some(UniqueField::PhoneNumber),
                _ => None,
            };
            if let Some(field) = field {
                return ApiError::duplicate(vec![field.violation()]);
            }
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// In-memory identity index spanning every role, mirroring the
    /// whole-table scan of the Postgres implementation.
    struct MemoryIndex {
        emails: HashSet<&'static str>,
        phones: HashSet<&'static str>,
    }

    #[async_trait]
    impl IdentityIndex for MemoryIndex {
        async fn value_exists(
            &self,
            field: UniqueField,
            value: &str,
        ) -> Result<bool, sqlx::Error> {
            Ok(match field {
                UniqueField::Email => self.emails.contains(value),
                UniqueField::PhoneNumber => self.phones.contains(value),
            })
        }
    }

    fn index_with_existing_identity() -> MemoryIndex {
        // One tutor and one employee already registered
        MemoryIndex {
            emails: HashSet::from(["tutor@x.com", "employee@x.com"]),
            phones: HashSet::from(["912345678", "960000000"]),
        }
    }

    #[tokio::test]
    async fn fresh_values_produce_no_violations() {
        let index = index_with_existing_identity();
        let violations = check_unique(
            &index,
            &[
                (UniqueField::Email, "new@x.com"),
                (UniqueField::PhoneNumber, "913333333"),
            ],
        )
        .await
        .unwrap();
        assert!(violations.is_empty());
    }

    #[tokio::test]
    async fn collision_with_another_roles_record_is_caught() {
        // Registering a patient with an email held by an employee
        let index = index_with_existing_identity();
        let violations = check_unique(
            &index,
            &[
                (UniqueField::Email, "employee@x.com"),
                (UniqueField::PhoneNumber, "913333333"),
            ],
        )
        .await
        .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "email");
    }

    #[tokio::test]
    async fn all_violations_are_accumulated_not_just_the_first() {
        let index = index_with_existing_identity();
        let violations = check_unique(
            &index,
            &[
                (UniqueField::Email, "tutor@x.com"),
                (UniqueField::PhoneNumber, "960000000"),
            ],
        )
        .await
        .unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, "email");
        assert_eq!(violations[1].field, "phone_number");
    }

    #[test]
    fn violation_messages_name_the_field() {
        let v = UniqueField::PhoneNumber.violation();
        assert_eq!(v.field, "phone_number");
        assert!(v.message.contains("phone number"));
    }
}
