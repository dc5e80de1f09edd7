//! # Enrollment Repository
//!
//! The enrollment state machine and the capacity invariant.
//!
//! ## Enrollment Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Enrollment Lifecycle                                 │
//! │                                                                         │
//! │  1. ENROLL                                                             │
//! │     └── enroll() → Enrollment { status: Registered }                   │
//! │         (counter +1 in the SAME transaction)                           │
//! │                                                                         │
//! │  2. PROGRESS                                                           │
//! │     └── set_status(Active)    → student is attending                   │
//! │     └── set_status(Completed) → withdrawal_date stamped                │
//! │                                                                         │
//! │  3. (OPTIONAL) WITHDRAW                                                │
//! │     └── withdraw() → status Withdrawn, withdrawal_date stamped,        │
//! │         counter -1 (clamped at 0) in the SAME transaction              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Counter Discipline
//! The capacity check and the increment are ONE guarded statement:
//!
//! ```sql
//! UPDATE courses SET current_participants = current_participants + 1
//! WHERE id = ?1 AND current_participants < max_participants
//! ```
//!
//! Zero affected rows means the course was full - nothing was written, and
//! the enrollment INSERT never runs. Two racing enrolls serialize on the
//! course row instead of both passing an application-level read-then-write.
//! Only enroll() and withdraw() move the counter; set_status() deliberately
//! does not, so callers needing a counter-consistent removal must use
//! withdraw().

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lingua_core::{CoreError, Course, Enrollment, EnrollmentStatus, Student};

const ENROLLMENT_COLUMNS: &str = r#"
    id, student_id, course_id, registration_date, withdrawal_date, status,
    final_grade, remarks, created_at, updated_at
"#;

/// Repository for enrollment database operations.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    pool: SqlitePool,
}

impl EnrollmentRepository {
    /// Creates a new EnrollmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EnrollmentRepository { pool }
    }

    // =========================================================================
    // Enroll
    // =========================================================================

    /// Enrolls a student in a course.
    ///
    /// ## Preconditions
    /// - student exists and is active
    /// - course exists
    /// - no enrollment row exists for the pair, in ANY status (a withdrawn
    ///   row still blocks re-enrollment - see DESIGN.md)
    /// - course has open seats
    ///
    /// ## Effect
    /// Creates the enrollment (status `registered`, registration date today)
    /// and increments the course's participant counter, both in one
    /// transaction - a crash between the two cannot leave them inconsistent.
    ///
    /// ## Errors
    /// - `StudentNotFound` / `CourseNotFound`
    /// - `AlreadyEnrolled` (duplicate pair)
    /// - `CourseFull` (no open seats; counter untouched)
    pub async fn enroll(&self, student_id: &str, course_id: &str) -> DbResult<Enrollment> {
        info!(student_id = %student_id, course_id = %course_id, "Enrolling student");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Student must exist and be active
        let student_exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM students WHERE id = ?1 AND is_active = 1")
                .bind(student_id)
                .fetch_optional(&mut *tx)
                .await?;
        if student_exists.is_none() {
            return Err(CoreError::StudentNotFound(student_id.to_string()).into());
        }

        // Course must exist; fetch the limit for the CourseFull message
        let max_participants: Option<i64> =
            sqlx::query_scalar("SELECT max_participants FROM courses WHERE id = ?1")
                .bind(course_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(max_participants) = max_participants else {
            return Err(CoreError::CourseNotFound(course_id.to_string()).into());
        };

        // Any existing row for the pair blocks, regardless of status
        let already: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM enrollments WHERE student_id = ?1 AND course_id = ?2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await?;
        if already.is_some() {
            return Err(CoreError::AlreadyEnrolled {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
            }
            .into());
        }

        // Capacity check and increment as one atomically-visible unit:
        // zero affected rows = course full, nothing written
        let bumped = sqlx::query(
            r#"
            UPDATE courses
            SET current_participants = current_participants + 1, updated_at = ?2
            WHERE id = ?1 AND current_participants < max_participants
            "#,
        )
        .bind(course_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if bumped.rows_affected() == 0 {
            return Err(CoreError::CourseFull {
                course_id: course_id.to_string(),
                max_participants,
            }
            .into());
        }

        let enrollment = Enrollment {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            registration_date: now.date_naive(),
            withdrawal_date: None,
            status: EnrollmentStatus::Registered,
            final_grade: None,
            remarks: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO enrollments (id, student_id, course_id, registration_date,
                                     withdrawal_date, status, final_grade, remarks,
                                     created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&enrollment.id)
        .bind(&enrollment.student_id)
        .bind(&enrollment.course_id)
        .bind(enrollment.registration_date)
        .bind(enrollment.withdrawal_date)
        .bind(enrollment.status)
        .bind(enrollment.final_grade)
        .bind(&enrollment.remarks)
        .bind(enrollment.created_at)
        .bind(enrollment.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(student_id = %student_id, course_id = %course_id, "Enrolled student");
        Ok(enrollment)
    }

    // =========================================================================
    // Withdraw
    // =========================================================================

    /// Withdraws a student from a course.
    ///
    /// Sets status to `withdrawn` with today's withdrawal date and decrements
    /// the course counter, in one transaction. The decrement is clamped: if
    /// the counter is already 0 it is left alone rather than driven negative
    /// (the invariant should prevent this, but the design tolerates drift).
    ///
    /// ## Errors
    /// - `NotEnrolled` when no enrollment row exists for the pair
    pub async fn withdraw(&self, student_id: &str, course_id: &str) -> DbResult<()> {
        info!(student_id = %student_id, course_id = %course_id, "Withdrawing student");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE enrollments
            SET status = ?3, withdrawal_date = ?4, updated_at = ?5
            WHERE student_id = ?1 AND course_id = ?2
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(EnrollmentStatus::Withdrawn)
        .bind(now.date_naive())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CoreError::NotEnrolled {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
            }
            .into());
        }

        // Clamped decrement: skip rather than go below zero
        let decremented = sqlx::query(
            r#"
            UPDATE courses
            SET current_participants = current_participants - 1, updated_at = ?2
            WHERE id = ?1 AND current_participants > 0
            "#,
        )
        .bind(course_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            warn!(course_id = %course_id, "Participant counter already at zero, skipping decrement");
        }

        tx.commit().await?;

        info!(student_id = %student_id, course_id = %course_id, "Withdrew student");
        Ok(())
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Overwrites an enrollment's status, with no transition validation.
    ///
    /// Moving to `completed` or `withdrawn` stamps today's withdrawal date.
    /// The course counter is NOT adjusted here - setting `withdrawn` through
    /// this method produces counter drift by design; use [`Self::withdraw`]
    /// for a counter-consistent removal.
    pub async fn set_status(
        &self,
        student_id: &str,
        course_id: &str,
        status: EnrollmentStatus,
    ) -> DbResult<Enrollment> {
        debug!(student_id = %student_id, course_id = %course_id, status = ?status, "Updating enrollment status");

        let now = Utc::now();
        let withdrawal_date = match status {
            EnrollmentStatus::Completed | EnrollmentStatus::Withdrawn => Some(now.date_naive()),
            EnrollmentStatus::Registered | EnrollmentStatus::Active => None,
        };

        let updated = match withdrawal_date {
            Some(date) => {
                sqlx::query(
                    r#"
                    UPDATE enrollments SET status = ?3, withdrawal_date = ?4, updated_at = ?5
                    WHERE student_id = ?1 AND course_id = ?2
                    "#,
                )
                .bind(student_id)
                .bind(course_id)
                .bind(status)
                .bind(date)
                .bind(now)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE enrollments SET status = ?3, updated_at = ?4
                    WHERE student_id = ?1 AND course_id = ?2
                    "#,
                )
                .bind(student_id)
                .bind(course_id)
                .bind(status)
                .bind(now)
                .execute(&self.pool)
                .await?
            }
        };

        if updated.rows_affected() == 0 {
            return Err(CoreError::NotEnrolled {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
            }
            .into());
        }

        self.get(student_id, course_id).await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets the enrollment for a (student, course) pair.
    ///
    /// ## Errors
    /// - `NotEnrolled` when no row exists
    pub async fn get(&self, student_id: &str, course_id: &str) -> DbResult<Enrollment> {
        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE student_id = ?1 AND course_id = ?2"
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        enrollment.ok_or_else(|| {
            DbError::Domain(CoreError::NotEnrolled {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
            })
        })
    }

    /// Lists a course's current enrollments (status registered or active).
    ///
    /// Completed and withdrawn rows are history, not roster.
    pub async fn list_active_for_course(&self, course_id: &str) -> DbResult<Vec<Enrollment>> {
        let enrollments = sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE course_id = ?1 AND status IN (?2, ?3) \
             ORDER BY registration_date, id"
        ))
        .bind(course_id)
        .bind(EnrollmentStatus::Registered)
        .bind(EnrollmentStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        Ok(enrollments)
    }

    /// Lists a student's current enrollments (status registered or active).
    pub async fn list_active_for_student(&self, student_id: &str) -> DbResult<Vec<Enrollment>> {
        let enrollments = sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE student_id = ?1 AND status IN (?2, ?3) \
             ORDER BY registration_date, id"
        ))
        .bind(student_id)
        .bind(EnrollmentStatus::Registered)
        .bind(EnrollmentStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        Ok(enrollments)
    }

    /// Lists the students currently in a course (roster view).
    pub async fn list_students_in_course(&self, course_id: &str) -> DbResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT s.id, s.first_name, s.last_name, s.email, s.phone, s.birth_date,
                   s.gender, s.nationality, s.native_language, s.registration_date,
                   s.is_active, s.created_at, s.updated_at
            FROM students s
            INNER JOIN enrollments e ON e.student_id = s.id
            WHERE e.course_id = ?1 AND e.status IN (?2, ?3)
            ORDER BY s.last_name, s.first_name
            "#,
        )
        .bind(course_id)
        .bind(EnrollmentStatus::Registered)
        .bind(EnrollmentStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// Lists the courses a student is currently in.
    pub async fn list_courses_for_student(&self, student_id: &str) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT c.id, c.name, c.course_type_id, c.room_id, c.trainer_id,
                   c.start_date, c.end_date, c.max_participants,
                   c.current_participants, c.status, c.description,
                   c.created_at, c.updated_at
            FROM courses c
            INNER JOIN enrollments e ON e.course_id = c.id
            WHERE e.student_id = ?1 AND e.status IN (?2, ?3)
            ORDER BY c.start_date, c.name
            "#,
        )
        .bind(student_id)
        .bind(EnrollmentStatus::Registered)
        .bind(EnrollmentStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    /// Whether a student is currently enrolled in a course.
    ///
    /// True iff an enrollment row exists with status registered or active.
    pub async fn is_enrolled(&self, student_id: &str, course_id: &str) -> DbResult<bool> {
        let exists: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM enrollments \
             WHERE student_id = ?1 AND course_id = ?2 AND status IN (?3, ?4)",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(EnrollmentStatus::Registered)
        .bind(EnrollmentStatus::Active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exists.is_some())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
