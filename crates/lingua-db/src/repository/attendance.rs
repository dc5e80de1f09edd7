//! # Attendance Repository
//!
//! Per-date attendance records and aggregated statistics.
//!
//! ## The Upsert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              record(student, course, date, ...)                         │
//! │                                                                         │
//! │  Row for (student, course, date) exists?                               │
//! │       │                                                                 │
//! │       ├── yes ──► UPDATE present/excused/remark in place               │
//! │       │           (id and recorded_at stay untouched)                  │
//! │       │                                                                 │
//! │       └── no  ──► INSERT with recorded_at = now                        │
//! │                                                                         │
//! │  The upsert is keyed by the logical triple, not by record id; the      │
//! │  UNIQUE index on (student_id, course_id, date) backs it against races. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Enrollment EXISTENCE is the precondition, not active status - a withdrawn
//! student's historical attendance can still be corrected.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lingua_core::{AttendanceEntry, AttendanceRecord, AttendanceStats, CoreError};

const ATTENDANCE_COLUMNS: &str = r#"
    id, student_id, course_id, date, present, excused, remark, recorded_at
"#;

/// Repository for attendance database operations.
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    /// Creates a new AttendanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AttendanceRepository { pool }
    }

    // =========================================================================
    // Record (upsert)
    // =========================================================================

    /// Records attendance for one student on one date.
    ///
    /// ## Preconditions
    /// - student exists, course exists
    /// - an enrollment row exists for the pair, in ANY status
    ///
    /// ## Effect
    /// Updates the existing (student, course, date) record in place, or
    /// inserts a new one with `recorded_at = now`.
    pub async fn record(
        &self,
        student_id: &str,
        course_id: &str,
        date: NaiveDate,
        present: bool,
        excused: bool,
        remark: Option<String>,
    ) -> DbResult<AttendanceRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let student_exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM students WHERE id = ?1")
                .bind(student_id)
                .fetch_optional(&mut *tx)
                .await?;
        if student_exists.is_none() {
            return Err(CoreError::StudentNotFound(student_id.to_string()).into());
        }

        let course_exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM courses WHERE id = ?1")
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?;
        if course_exists.is_none() {
            return Err(CoreError::CourseNotFound(course_id.to_string()).into());
        }

        // Enrollment existence, any status: withdrawn students keep their
        // correctable history
        let enrolled: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM enrollments WHERE student_id = ?1 AND course_id = ?2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await?;
        if enrolled.is_none() {
            return Err(CoreError::NotEnrolled {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
            }
            .into());
        }

        let existing = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE student_id = ?1 AND course_id = ?2 AND date = ?3"
        ))
        .bind(student_id)
        .bind(course_id)
        .bind(date)
        .fetch_optional(&mut *tx)
        .await?;

        let record = match existing {
            Some(existing) => {
                debug!(id = %existing.id, date = %date, "Updating attendance in place");

                sqlx::query(
                    "UPDATE attendance SET present = ?2, excused = ?3, remark = ?4 WHERE id = ?1",
                )
                .bind(&existing.id)
                .bind(present)
                .bind(excused)
                .bind(&remark)
                .execute(&mut *tx)
                .await?;

                AttendanceRecord {
                    present,
                    excused,
                    remark,
                    ..existing
                }
            }
            None => {
                let record = AttendanceRecord {
                    id: Uuid::new_v4().to_string(),
                    student_id: student_id.to_string(),
                    course_id: course_id.to_string(),
                    date,
                    present,
                    excused,
                    remark,
                    recorded_at: now,
                };

                debug!(id = %record.id, date = %date, "Inserting attendance");

                sqlx::query(
                    r#"
                    INSERT INTO attendance (id, student_id, course_id, date, present,
                                            excused, remark, recorded_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    "#,
                )
                .bind(&record.id)
                .bind(&record.student_id)
                .bind(&record.course_id)
                .bind(record.date)
                .bind(record.present)
                .bind(record.excused)
                .bind(&record.remark)
                .bind(record.recorded_at)
                .execute(&mut *tx)
                .await?;

                record
            }
        };

        tx.commit().await?;
        Ok(record)
    }

    /// Records attendance for a whole course on one date.
    ///
    /// The course is resolved once up front (missing course aborts the
    /// batch); after that, each entry is applied independently. A failing
    /// entry - e.g. a student who is not enrolled - is logged and skipped,
    /// never aborting the rest. Callers compare input and output counts to
    /// detect partial failure.
    pub async fn bulk_record(
        &self,
        course_id: &str,
        date: NaiveDate,
        entries: &[AttendanceEntry],
    ) -> DbResult<Vec<AttendanceRecord>> {
        let course_exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM courses WHERE id = ?1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;
        if course_exists.is_none() {
            return Err(CoreError::CourseNotFound(course_id.to_string()).into());
        }

        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            match self
                .record(
                    &entry.student_id,
                    course_id,
                    date,
                    entry.present,
                    entry.excused,
                    entry.remark.clone(),
                )
                .await
            {
                Ok(record) => results.push(record),
                Err(err) => {
                    error!(
                        student_id = %entry.student_id,
                        course_id = %course_id,
                        %err,
                        "Skipping attendance entry"
                    );
                }
            }
        }

        info!(
            course_id = %course_id,
            date = %date,
            recorded = results.len(),
            submitted = entries.len(),
            "Bulk attendance processed"
        );

        Ok(results)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Attendance statistics for one student in one course.
    ///
    /// Pure aggregation over the student's records; zero records yield an
    /// all-zero result with rate 0.0.
    pub async fn statistics(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> DbResult<AttendanceStats> {
        let records = self
            .list_by_student_and_course(student_id, course_id)
            .await?;
        Ok(AttendanceStats::from_records(&records))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lists all attendance records.
    pub async fn list_all(&self) -> DbResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance ORDER BY date, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Gets an attendance record by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists a course's attendance for one date (the class register page).
    pub async fn list_by_course_and_date(
        &self,
        course_id: &str,
        date: NaiveDate,
    ) -> DbResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE course_id = ?1 AND date = ?2 ORDER BY id"
        ))
        .bind(course_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Lists a student's attendance history in a course.
    pub async fn list_by_student_and_course(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> DbResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE student_id = ?1 AND course_id = ?2 ORDER BY date"
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Lists attendance within a date range (inclusive).
    pub async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE date >= ?1 AND date <= ?2 ORDER BY date, id"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Deletes an attendance record.
    ///
    /// Attendance rows carry no tombstone flag; a mis-entered record for the
    /// wrong day is removed physically.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Attendance record", id));
        }

        info!(id = %id, "Deleted attendance record");
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
    use lingua_core::EnrollmentStatus;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    async fn enrolled_student(
        ctx: &testutil::TestContext,
        course_id: &str,
        first: &str,
        last: &str,
    ) -> String {
        let student = ctx.student(first, last).await;
        ctx.db
            .enrollments()
            .enroll(&student.id, course_id)
            .await
            .unwrap();
        student.id
    }

    #[tokio::test]
    async fn recording_twice_updates_the_same_row() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let student_id = enrolled_student(&ctx, &course.id, "Anna", "Schmidt").await;
        let attendance = ctx.db.attendance();

        let first = attendance
            .record(&student_id, &course.id, day(1), true, false, None)
            .await
            .unwrap();

        let second = attendance
            .record(
                &student_id,
                &course.id,
                day(1),
                false,
                true,
                Some("sick note".to_string()),
            )
            .await
            .unwrap();

        // Same row: id and recorded_at survive, values are overwritten
        assert_eq!(second.id, first.id);
        assert_eq!(second.recorded_at, first.recorded_at);
        assert!(!second.present);
        assert!(second.excused);

        let all = attendance
            .list_by_student_and_course(&student_id, &course.id)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].remark.as_deref(), Some("sick note"));
    }

    #[tokio::test]
    async fn recording_requires_an_enrollment_row_in_any_status() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let attendance = ctx.db.attendance();

        // Never enrolled: rejected
        let outsider = ctx.student("Lena", "Vogel").await;
        let err = attendance
            .record(&outsider.id, &course.id, day(1), true, false, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NotEnrolled { .. })
        ));

        // Withdrawn: still correctable
        let former = enrolled_student(&ctx, &course.id, "Anna", "Schmidt").await;
        ctx.db
            .enrollments()
            .set_status(&former, &course.id, EnrollmentStatus::Withdrawn)
            .await
            .unwrap();

        let record = attendance
            .record(&former, &course.id, day(1), false, true, None)
            .await
            .unwrap();
        assert!(!record.present);
    }

    #[tokio::test]
    async fn statistics_partition_and_rounding() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let student_id = enrolled_student(&ctx, &course.id, "Anna", "Schmidt").await;
        let attendance = ctx.db.attendance();

        attendance
            .record(&student_id, &course.id, day(1), true, false, None)
            .await
            .unwrap();
        attendance
            .record(&student_id, &course.id, day(2), true, false, None)
            .await
            .unwrap();
        attendance
            .record(&student_id, &course.id, day(3), false, true, None)
            .await
            .unwrap();

        let stats = attendance.statistics(&student_id, &course.id).await.unwrap();
        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.present_days, 2);
        assert_eq!(stats.excused_days, 1);
        assert_eq!(stats.unexcused_days, 0);
        assert_eq!(
            stats.present_days + stats.excused_days + stats.unexcused_days,
            stats.total_days
        );
        assert_eq!(stats.attendance_rate, 66.67);
    }

    #[tokio::test]
    async fn statistics_without_records_are_zero() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let student_id = enrolled_student(&ctx, &course.id, "Anna", "Schmidt").await;

        let stats = ctx
            .db
            .attendance()
            .statistics(&student_id, &course.id)
            .await
            .unwrap();
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.attendance_rate, 0.0);
    }

    #[tokio::test]
    async fn bulk_record_skips_failures_without_raising() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let enrolled = enrolled_student(&ctx, &course.id, "Anna", "Schmidt").await;

        let entries = vec![
            AttendanceEntry {
                student_id: enrolled.clone(),
                present: true,
                excused: false,
                remark: None,
            },
            AttendanceEntry {
                student_id: "student-999".to_string(),
                present: true,
                excused: false,
                remark: None,
            },
        ];

        let results = ctx
            .db
            .attendance()
            .bulk_record(&course.id, day(1), &entries)
            .await
            .unwrap();

        // Only the enrolled student went through; no error surfaced
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].student_id, enrolled);
    }

    #[tokio::test]
    async fn bulk_record_rejects_missing_course_up_front() {
        let ctx = testutil::context().await;

        let err = ctx
            .db
            .attendance()
            .bulk_record("missing", day(1), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CourseNotFound(_))));
    }

    #[tokio::test]
    async fn list_and_delete_round_trip() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let student_id = enrolled_student(&ctx, &course.id, "Anna", "Schmidt").await;
        let attendance = ctx.db.attendance();

        let record = attendance
            .record(&student_id, &course.id, day(5), true, false, None)
            .await
            .unwrap();

        let by_date = attendance
            .list_by_course_and_date(&course.id, day(5))
            .await
            .unwrap();
        assert_eq!(by_date.len(), 1);

        let ranged = attendance.list_between(day(1), day(31)).await.unwrap();
        assert_eq!(ranged.len(), 1);

        attendance.delete(&record.id).await.unwrap();
        assert!(attendance.get_by_id(&record.id).await.unwrap().is_none());

        let err = attendance.delete(&record.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
