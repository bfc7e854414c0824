use crate::error::{FieldError, ValidationErrors};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted student record. Mirrors one row of the `students` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Student {
    /// Assigned by storage on insert, never changed afterwards.
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
}

/// The body accepted by create and full update.
///
/// Absent fields decode to their zero value so that a missing `name` is
/// reported as a validation failure on `name` rather than as a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age: i32,
}

impl NewStudent {
    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Err(e) = validate_name(&self.name) {
            errors.push(e);
        }
        if let Err(e) = validate_email(&self.email) {
            errors.push(e);
        }
        if let Err(e) = validate_age(i64::from(self.age)) {
            errors.push(e);
        }
        errors.into_result()
    }
}

pub fn validate_name(name: &str) -> Result<(), FieldError> {
    if name.trim().is_empty() {
        return Err(FieldError::new("name", "required", "field name is required"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() {
        return Err(FieldError::new("email", "required", "field email is required"));
    }
    if !email_address::EmailAddress::is_valid(email) {
        return Err(FieldError::new("email", "email", "field email must be a valid email address"));
    }
    Ok(())
}

/// Takes an `i64` so that out-of-range values coming from an untyped patch body
/// are rejected here instead of being truncated.
pub fn validate_age(age: i64) -> Result<i32, FieldError> {
    if age <= 0 {
        return Err(FieldError::new("age", "gt", "field age must be greater than zero"));
    }
    i32::try_from(age).map_err(|_| FieldError::new("age", "range", "field age is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> NewStudent {
        NewStudent {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            age: 21,
        }
    }

    #[test]
    fn valid_student_passes() {
        assert_eq!(ann().validate(), Ok(()));
    }

    #[test]
    fn empty_name_is_rejected_on_name() {
        let student = NewStudent { name: String::new(), ..ann() };
        let errors = student.validate().unwrap_err();
        assert_eq!(errors.fields().len(), 1);
        assert_eq!(errors.fields()[0].field, "name");
        assert_eq!(errors.fields()[0].rule, "required");
    }

    #[test]
    fn malformed_email_is_rejected() {
        let student = NewStudent { email: "not-an-email".to_string(), ..ann() };
        let errors = student.validate().unwrap_err();
        assert_eq!(errors.fields()[0].field, "email");
        assert_eq!(errors.fields()[0].rule, "email");
    }

    #[test]
    fn non_positive_age_is_rejected() {
        for age in [0, -3] {
            let student = NewStudent { age, ..ann() };
            let errors = student.validate().unwrap_err();
            assert_eq!(errors.fields()[0].field, "age");
        }
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let student: NewStudent = serde_json::from_str("{}").unwrap();
        let errors = student.validate().unwrap_err();
        let fields: Vec<_> = errors.fields().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "age"]);
        assert!(errors.to_string().contains("field name is required"));
    }

    #[test]
    fn oversized_age_is_out_of_range() {
        let err = validate_age(i64::from(i32::MAX) + 1).unwrap_err();
        assert_eq!(err.rule, "range");
    }
}
