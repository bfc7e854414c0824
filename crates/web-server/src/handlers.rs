use crate::{error::AppError, AppState};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{NewStudent, Student, StudentPatch};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

/// Body of a successful update, patch or delete.
#[derive(Debug, Serialize)]
pub struct Confirmation {
    pub status: &'static str,
    pub id: i64,
}

impl Confirmation {
    fn ok(id: i64) -> Json<Self> {
        Json(Self { status: "OK", id })
    }
}

/// Parses the `{id}` path segment. The router does not constrain it, so
/// anything other than plain ASCII digits fitting an `i64` is rejected here.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidId);
    }
    raw.parse::<i64>().map_err(|_| AppError::InvalidId)
}

/// Decodes a JSON body, distinguishing an empty body from malformed JSON.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Decode("empty body".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| AppError::Decode(e.to_string()))
}

/// # POST /api/students
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Created>), AppError> {
    tracing::info!("creating new student");
    let student: NewStudent = decode_body(&body)?;
    student.validate()?;

    let id = state
        .storage
        .create_student(&student.name, &student.email, student.age)
        .await?;

    tracing::info!(student_id = id, "student created");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// # GET /api/students/:id
pub async fn get_student_by_id(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Student>, AppError> {
    let id = parse_id(&raw_id)?;
    tracing::info!(student_id = id, "getting student by id");
    let student = state.storage.get_student_by_id(id).await?;
    Ok(Json(student))
}

/// # GET /api/students
pub async fn get_students(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Student>>, AppError> {
    let students = state.storage.get_students().await?;
    Ok(Json(students))
}

/// # PUT /api/students/:id
/// Replaces every mutable field. The body has the same shape as create.
pub async fn update_student(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Confirmation>, AppError> {
    let id = parse_id(&raw_id)?;
    let student: NewStudent = decode_body(&body)?;
    student.validate()?;

    state
        .storage
        .update_student(id, &student.name, &student.email, student.age)
        .await?;

    tracing::info!(student_id = id, "student updated");
    Ok(Confirmation::ok(id))
}

/// # PATCH /api/students/:id
/// Accepts any JSON object. Only `name`, `email` and `age` are applied.
pub async fn patch_student(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Confirmation>, AppError> {
    let id = parse_id(&raw_id)?;
    let Value::Object(fields) = decode_body::<Value>(&body)? else {
        return Err(AppError::Decode("request body must be a JSON object".to_string()));
    };
    let patch = StudentPatch::from_fields(&fields)?;

    state.storage.patch_student(id, &patch).await?;

    tracing::info!(student_id = id, fields = patch.assignments().len(), "student patched");
    Ok(Confirmation::ok(id))
}

/// # DELETE /api/students/:id
pub async fn delete_student(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Confirmation>, AppError> {
    let id = parse_id(&raw_id)?;
    state.storage.delete_student(id).await?;
    tracing::info!(student_id = id, "student deleted");
    Ok(Confirmation::ok(id))
}

/// # HEAD /api/students/:id
/// 200 or 404, never a body.
pub async fn student_exists(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&raw_id)?;
    if state.storage.student_exists(id).await? {
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_digits_only() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("007").unwrap(), 7);
        for raw in ["", "-1", "+1", "1a", "abc", " 1", "1.0", "99999999999999999999"] {
            assert!(matches!(parse_id(raw), Err(AppError::InvalidId)), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn decode_body_reports_empty_and_malformed_separately() {
        let err = decode_body::<NewStudent>(&Bytes::new()).unwrap_err();
        assert!(matches!(err, AppError::Decode(ref m) if m == "empty body"));

        let err = decode_body::<NewStudent>(&Bytes::from_static(b"{\"name\":")).unwrap_err();
        assert!(matches!(err, AppError::Decode(ref m) if m != "empty body"));

        let err = decode_body::<NewStudent>(&Bytes::from_static(b"{\"age\":\"old\"}")).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }
}
