//! # Student Repository
//!
//! Database operations for students (Teilnehmer). Soft deletes keep the
//! enrollment and attendance history of former students intact; the active
//! flag only controls listings and new enrollments.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lingua_core::validation::{validate_email, validate_name};
use lingua_core::{NewStudent, Student, StudentUpdate};

const STUDENT_COLUMNS: &str = r#"
    id, first_name, last_name, email, phone, birth_date, gender, nationality,
    native_language, registration_date, is_active, created_at, updated_at
"#;

/// Repository for student database operations.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: SqlitePool,
}

impl StudentRepository {
    /// Creates a new StudentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StudentRepository { pool }
    }

    /// Lists active students, sorted by last name.
    pub async fn list_active(&self) -> DbResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE is_active = 1 ORDER BY last_name, first_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// Gets a student by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    /// Searches students by name, case-insensitive substring over first and
    /// last name. Matches inactive students too - the front desk looks up
    /// former students as often as current ones.
    pub async fn search_by_name(&self, term: &str) -> DbResult<Vec<Student>> {
        let pattern = format!("%{}%", term.to_lowercase());

        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students \
             WHERE lower(first_name) LIKE ?1 OR lower(last_name) LIKE ?1 \
             ORDER BY last_name, first_name"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// Searches students by email, case-insensitive substring.
    pub async fn search_by_email(&self, term: &str) -> DbResult<Vec<Student>> {
        let pattern = format!("%{}%", term.to_lowercase());

        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students \
             WHERE email IS NOT NULL AND lower(email) LIKE ?1 \
             ORDER BY last_name, first_name"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// Inserts a new student.
    ///
    /// The registration date defaults to today when the payload omits it.
    pub async fn insert(&self, new: NewStudent) -> DbResult<Student> {
        validate_name("first_name", &new.first_name)?;
        validate_name("last_name", &new.last_name)?;
        if let Some(email) = &new.email {
            validate_email(email)?;
        }

        let now = Utc::now();
        let student = Student {
            id: Uuid::new_v4().to_string(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            birth_date: new.birth_date,
            gender: new.gender,
            nationality: new.nationality,
            native_language: new.native_language,
            registration_date: new.registration_date.unwrap_or_else(|| now.date_naive()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %student.id, last_name = %student.last_name, "Inserting student");

        sqlx::query(
            r#"
            INSERT INTO students (id, first_name, last_name, email, phone, birth_date,
                                  gender, nationality, native_language,
                                  registration_date, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&student.id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.birth_date)
        .bind(student.gender)
        .bind(&student.nationality)
        .bind(&student.native_language)
        .bind(student.registration_date)
        .bind(student.is_active)
        .bind(student.created_at)
        .bind(student.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(student)
    }

    /// Updates a student (full overwrite of business fields).
    pub async fn update(&self, id: &str, update: StudentUpdate) -> DbResult<Student> {
        validate_name("first_name", &update.first_name)?;
        validate_name("last_name", &update.last_name)?;
        if let Some(email) = &update.email {
            validate_email(email)?;
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE students SET first_name = ?2, last_name = ?3, email = ?4, phone = ?5,
                                birth_date = ?6, gender = ?7, nationality = ?8,
                                native_language = ?9, registration_date = ?10,
                                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(update.birth_date)
        .bind(update.gender)
        .bind(&update.nationality)
        .bind(&update.native_language)
        .bind(update.registration_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Student", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Student", id))
    }

    /// Soft-deletes a student. History (enrollments, attendance) survives.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE students SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Student", id));
        }

        info!(id = %id, "Deactivated student");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[tokio::test]
    async fn registration_date_defaults_to_today() {
        let ctx = testutil::context().await;
        let student = ctx.student("Anna", "Schmidt").await;

        assert_eq!(student.registration_date, Utc::now().date_naive());
        assert!(student.is_active);
    }

    #[tokio::test]
    async fn name_search_is_case_insensitive_and_matches_both_names() {
        let ctx = testutil::context().await;
        ctx.student("Anna", "Schmidt").await;
        ctx.student("Omar", "Haddad").await;

        let by_first = ctx.db.students().search_by_name("ANNA").await.unwrap();
        assert_eq!(by_first.len(), 1);
        assert_eq!(by_first[0].first_name, "Anna");

        let by_last = ctx.db.students().search_by_name("hadd").await.unwrap();
        assert_eq!(by_last.len(), 1);
        assert_eq!(by_last[0].last_name, "Haddad");
    }

    #[tokio::test]
    async fn email_search_skips_students_without_email() {
        let ctx = testutil::context().await;
        ctx.student("Anna", "Schmidt").await;
        ctx.db
            .students()
            .insert(NewStudent {
                first_name: "Omar".to_string(),
                last_name: "Haddad".to_string(),
                email: None,
                phone: None,
                birth_date: None,
                gender: None,
                nationality: None,
                native_language: None,
                registration_date: None,
            })
            .await
            .unwrap();

        let hits = ctx
            .db
            .students()
            .search_by_email("example.org")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "Anna");

        let misses = ctx.db.students().search_by_email("nobody").await.unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn deactivate_hides_but_keeps_the_row() {
        let ctx = testutil::context().await;
        let student = ctx.student("Anna", "Schmidt").await;

        ctx.db.students().deactivate(&student.id).await.unwrap();

        assert!(ctx.db.students().list_active().await.unwrap().is_empty());
        let row = ctx
            .db
            .students()
            .get_by_id(&student.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!row.is_active);
    }

    #[tokio::test]
    async fn invalid_email_fails_validation() {
        let ctx = testutil::context().await;

        let err = ctx
            .db
            .students()
            .insert(NewStudent {
                first_name: "Anna".to_string(),
                last_name: "Schmidt".to_string(),
                email: Some("not-an-email".to_string()),
                phone: None,
                birth_date: None,
                gender: None,
                nationality: None,
                native_language: None,
                registration_date: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(_)));
    }
}
