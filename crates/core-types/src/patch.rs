use crate::error::{FieldError, ValidationErrors};
use crate::structs::{validate_age, validate_email, validate_name};
use serde_json::{Map, Value};

/// The closed set of columns a partial update may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchField {
    Name,
    Email,
    Age,
}

impl PatchField {
    pub const ALL: [PatchField; 3] = [PatchField::Name, PatchField::Email, PatchField::Age];

    /// Maps a client-supplied key onto the allow-list. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(PatchField::Name),
            "email" => Some(PatchField::Email),
            "age" => Some(PatchField::Age),
            _ => None,
        }
    }

    /// The column name written into SQL. Always a static string.
    pub fn column(&self) -> &'static str {
        match self {
            PatchField::Name => "name",
            PatchField::Email => "email",
            PatchField::Age => "age",
        }
    }

    /// Coerces an untyped JSON value into the column's type and checks it
    /// against the same rule used on create.
    fn coerce(&self, value: &Value) -> Result<PatchValue, FieldError> {
        let field = self.column();
        match self {
            PatchField::Name | PatchField::Email => {
                let Value::String(text) = value else {
                    return Err(FieldError::new(field, "string", format!("field {field} must be a string")));
                };
                if *self == PatchField::Name {
                    validate_name(text)?;
                } else {
                    validate_email(text)?;
                }
                Ok(PatchValue::Text(text.clone()))
            }
            PatchField::Age => {
                let Some(age) = value.as_i64() else {
                    return Err(FieldError::new(field, "integer", "field age must be an integer"));
                };
                Ok(PatchValue::Integer(validate_age(age)?))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchValue {
    Text(String),
    Integer(i32),
}

/// A sparse update: only the fields present are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl StudentPatch {
    /// Builds a patch from an open JSON object.
    ///
    /// Keys outside the allow-list are skipped. Recognised keys whose values do
    /// not coerce to the column type are collected as validation errors.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut patch = StudentPatch::default();
        let mut errors = ValidationErrors::default();

        for (key, value) in fields {
            let Some(field) = PatchField::from_key(key) else {
                tracing::debug!(key = %key, "ignoring unrecognised patch field");
                continue;
            };
            match field.coerce(value) {
                Ok(PatchValue::Text(text)) if field == PatchField::Name => patch.name = Some(text),
                Ok(PatchValue::Text(text)) => patch.email = Some(text),
                Ok(PatchValue::Integer(age)) => patch.age = Some(age),
                Err(e) => errors.push(e),
            }
        }

        errors.into_result()?;
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }

    /// The present fields in fixed column order, paired with their values.
    pub fn assignments(&self) -> Vec<(PatchField, PatchValue)> {
        PatchField::ALL
            .iter()
            .filter_map(|field| {
                let value = match field {
                    PatchField::Name => self.name.clone().map(PatchValue::Text),
                    PatchField::Email => self.email.clone().map(PatchValue::Text),
                    PatchField::Age => self.age.map(PatchValue::Integer),
                }?;
                Some((*field, value))
            })
            .collect()
    }
}
