use crate::error::DbError;
use async_trait::async_trait;
use core_types::{Student, StudentPatch};

/// The operations the HTTP layer needs from persistence.
///
/// Implementations report a missing id as `DbError::NotFound`, never as a raw
/// backend error. Arguments are already validated primitives.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Inserts a new row and returns its assigned id.
    async fn create_student(&self, name: &str, email: &str, age: i32) -> Result<i64, DbError>;

    async fn get_student_by_id(&self, id: i64) -> Result<Student, DbError>;

    /// All records in ascending id order. Empty when the table is empty.
    async fn get_students(&self) -> Result<Vec<Student>, DbError>;

    /// Replaces all three mutable fields.
    async fn update_student(&self, id: i64, name: &str, email: &str, age: i32) -> Result<(), DbError>;

    /// Replaces only the fields present in `patch`.
    async fn patch_student(&self, id: i64, patch: &StudentPatch) -> Result<(), DbError>;

    /// Deleting an id that does not exist is `NotFound`, not success.
    async fn delete_student(&self, id: i64) -> Result<(), DbError>;

    async fn student_exists(&self, id: i64) -> Result<bool, DbError>;
}
