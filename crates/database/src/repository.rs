use crate::DbError;
use crate::storage::Storage;
use async_trait::async_trait;
use core_types::{PatchValue, Student, StudentPatch};
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::QueryBuilder;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Maps a write that touched no rows onto `NotFound`.
fn expect_affected(rows_affected: u64, id: i64) -> Result<(), DbError> {
    if rows_affected == 0 {
        return Err(DbError::NotFound(id));
    }
    Ok(())
}

#[async_trait]
impl Storage for DbRepository {
    async fn create_student(&self, name: &str, email: &str, age: i32) -> Result<i64, DbError> {
        let result = sqlx::query("INSERT INTO students (name, email, age) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(age)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Student, DbError> {
        sqlx::query_as::<_, Student>("SELECT id, name, email, age FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound(id))
    }

    async fn get_students(&self) -> Result<Vec<Student>, DbError> {
        let students =
            sqlx::query_as::<_, Student>("SELECT id, name, email, age FROM students ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(students)
    }

    async fn update_student(&self, id: i64, name: &str, email: &str, age: i32) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE students SET name = ?, email = ?, age = ? WHERE id = ?")
            .bind(name)
            .bind(email)
            .bind(age)
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), id)
    }

    /// Builds `UPDATE students SET col = ?, ... WHERE id = ?` from the present
    /// fields only. Column names come from `PatchField::column`, never from the
    /// request. An empty patch issues no UPDATE and only reports whether the
    /// id exists.
    async fn patch_student(&self, id: i64, patch: &StudentPatch) -> Result<(), DbError> {
        let assignments = patch.assignments();
        if assignments.is_empty() {
            tracing::debug!(student_id = id, "empty patch, nothing to update");
            return if self.student_exists(id).await? {
                Ok(())
            } else {
                Err(DbError::NotFound(id))
            };
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE students SET ");
        let mut set = builder.separated(", ");
        for (field, value) in assignments {
            set.push(field.column());
            set.push_unseparated(" = ");
            match value {
                PatchValue::Text(text) => set.push_bind_unseparated(text),
                PatchValue::Integer(number) => set.push_bind_unseparated(number),
            };
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        expect_affected(result.rows_affected(), id)
    }

    async fn delete_student(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), id)
    }

    async fn student_exists(&self, id: i64) -> Result<bool, DbError> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{connect_in_memory, run_migrations};
    use serde_json::{json, Value};

    async fn repo() -> DbRepository {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        DbRepository::new(pool)
    }

    fn patch(body: Value) -> StudentPatch {
        let Value::Object(map) = body else { panic!("patch body must be an object") };
        StudentPatch::from_fields(&map).unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = repo().await;
        let id = repo.create_student("Ann", "ann@x.com", 21).await.unwrap();
        assert_eq!(id, 1);

        let student = repo.get_student_by_id(id).await.unwrap();
        assert_eq!(
            student,
            Student { id, name: "Ann".into(), email: "ann@x.com".into(), age: 21 }
        );
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let repo = repo().await;
        assert!(matches!(repo.get_student_by_id(9999).await, Err(DbError::NotFound(9999))));
        assert!(!repo.student_exists(9999).await.unwrap());
    }

    #[tokio::test]
    async fn list_is_empty_then_ordered_by_id() {
        let repo = repo().await;
        assert!(repo.get_students().await.unwrap().is_empty());

        repo.create_student("Ann", "ann@x.com", 21).await.unwrap();
        repo.create_student("Bea", "bea@x.com", 22).await.unwrap();
        let ids: Vec<_> = repo.get_students().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let repo = repo().await;
        let id = repo.create_student("Ann", "ann@x.com", 21).await.unwrap();
        repo.update_student(id, "Anna", "anna@y.org", 30).await.unwrap();

        let student = repo.get_student_by_id(id).await.unwrap();
        assert_eq!((student.name.as_str(), student.email.as_str(), student.age), ("Anna", "anna@y.org", 30));
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let repo = repo().await;
        let err = repo.update_student(7, "Ann", "ann@x.com", 21).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(7)));
    }

    #[tokio::test]
    async fn patch_changes_only_given_fields() {
        let repo = repo().await;
        let id = repo.create_student("Ann", "ann@x.com", 21).await.unwrap();
        repo.patch_student(id, &patch(json!({ "age": 22 }))).await.unwrap();

        let student = repo.get_student_by_id(id).await.unwrap();
        assert_eq!(student.age, 22);
        assert_eq!(student.name, "Ann");
        assert_eq!(student.email, "ann@x.com");
    }

    #[tokio::test]
    async fn patch_with_several_fields() {
        let repo = repo().await;
        let id = repo.create_student("Ann", "ann@x.com", 21).await.unwrap();
        repo.patch_student(id, &patch(json!({ "name": "Bea", "email": "bea@x.com" })))
            .await
            .unwrap();

        let student = repo.get_student_by_id(id).await.unwrap();
        assert_eq!((student.name.as_str(), student.email.as_str(), student.age), ("Bea", "bea@x.com", 21));
    }

    #[tokio::test]
    async fn patch_with_only_unknown_keys_is_a_no_op() {
        let repo = repo().await;
        let id = repo.create_student("Ann", "ann@x.com", 21).await.unwrap();
        repo.patch_student(id, &patch(json!({ "nickname": "annie" }))).await.unwrap();

        let student = repo.get_student_by_id(id).await.unwrap();
        assert_eq!(student.name, "Ann");
    }

    #[tokio::test]
    async fn patch_of_missing_id_is_not_found() {
        let repo = repo().await;
        let err = repo.patch_student(3, &patch(json!({ "age": 40 }))).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(3)));

        let err = repo.patch_student(3, &StudentPatch::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(3)));
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let repo = repo().await;
        let id = repo.create_student("Ann", "ann@x.com", 21).await.unwrap();

        repo.delete_student(id).await.unwrap();
        assert!(matches!(repo.get_student_by_id(id).await, Err(DbError::NotFound(_))));
        assert!(matches!(repo.delete_student(id).await, Err(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn exists_has_no_side_effects() {
        let repo = repo().await;
        let id = repo.create_student("Ann", "ann@x.com", 21).await.unwrap();
        assert!(repo.student_exists(id).await.unwrap());
        assert!(repo.student_exists(id).await.unwrap());
        assert_eq!(repo.get_students().await.unwrap().len(), 1);
    }
}
