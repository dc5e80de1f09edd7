//! # Course Repository
//!
//! Database operations for the course registry.
//!
//! ## Status Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Course Status                                       │
//! │                                                                         │
//! │   planned ──► running ──► completed                                    │
//! │      │           │                                                      │
//! │      └───────────┴──────► cancelled                                    │
//! │                                                                         │
//! │   set_status() overwrites UNCONDITIONALLY - completed → planned is     │
//! │   permitted. Back-office corrections outrank a transition graph here.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The participant counter on the course row is owned by the enrollment
//! repository; nothing in this module touches it apart from carrying it
//! through updates unchanged.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lingua_core::validation::{
    effective_max_participants, validate_date_range, validate_max_participants, validate_name,
};
use lingua_core::{
    CoreError, Course, CourseStatus, CourseUpdate, NewCourse, ValidationError, MAX_COURSE_CAPACITY,
};

const COURSE_COLUMNS: &str = r#"
    id, name, course_type_id, room_id, trainer_id, start_date, end_date,
    max_participants, current_participants, status, description,
    created_at, updated_at
"#;

/// Repository for course database operations.
#[derive(Debug, Clone)]
pub struct CourseRepository {
    pool: SqlitePool,
}

impl CourseRepository {
    /// Creates a new CourseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CourseRepository { pool }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets a course by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    /// Lists all courses, newest start date first.
    pub async fn list_all(&self) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY start_date DESC, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    /// Lists courses with the given status.
    pub async fn list_by_status(&self, status: CourseStatus) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE status = ?1 ORDER BY start_date, name"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    /// Lists current courses: planned or running.
    pub async fn list_current(&self) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses \
             WHERE status IN (?1, ?2) ORDER BY start_date, name"
        ))
        .bind(CourseStatus::Planned)
        .bind(CourseStatus::Running)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    /// Lists courses taught by a trainer.
    pub async fn list_by_trainer(&self, trainer_id: &str) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE trainer_id = ?1 ORDER BY start_date, name"
        ))
        .bind(trainer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    /// Lists planned courses that still have open seats.
    ///
    /// "Open seats" shares its definition with the enrollment capacity
    /// check: strictly fewer current participants than the maximum.
    pub async fn list_available(&self) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses \
             WHERE current_participants < max_participants AND status = ?1 \
             ORDER BY start_date, name"
        ))
        .bind(CourseStatus::Planned)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    /// Lists courses starting within the given date range (inclusive).
    pub async fn list_starting_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses \
             WHERE start_date >= ?1 AND start_date <= ?2 ORDER BY start_date, name"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a new course.
    ///
    /// ## Validation
    /// - name non-blank, seat limit within 1..=50
    /// - end date strictly after start date, when given
    /// - course type, room and trainer must exist (NotFound otherwise)
    ///
    /// Status starts as `planned` with an empty participant counter.
    pub async fn insert(&self, new: NewCourse) -> DbResult<Course> {
        validate_name("name", &new.name)?;
        let max_participants = effective_max_participants(new.max_participants);
        validate_max_participants(max_participants)?;
        validate_date_range(new.start_date, new.end_date)?;

        self.require_course_type(&new.course_type_id).await?;
        self.require_room(&new.room_id).await?;
        self.require_trainer(&new.trainer_id).await?;

        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            course_type_id: new.course_type_id,
            room_id: new.room_id,
            trainer_id: new.trainer_id,
            start_date: new.start_date,
            end_date: new.end_date,
            max_participants,
            current_participants: 0,
            status: CourseStatus::Planned,
            description: new.description,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %course.id, name = %course.name, "Inserting course");

        sqlx::query(
            r#"
            INSERT INTO courses (id, name, course_type_id, room_id, trainer_id,
                                 start_date, end_date, max_participants,
                                 current_participants, status, description,
                                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&course.id)
        .bind(&course.name)
        .bind(&course.course_type_id)
        .bind(&course.room_id)
        .bind(&course.trainer_id)
        .bind(course.start_date)
        .bind(course.end_date)
        .bind(course.max_participants)
        .bind(course.current_participants)
        .bind(course.status)
        .bind(&course.description)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %course.id, name = %course.name, "Created course");
        Ok(course)
    }

    /// Updates a course.
    ///
    /// Scalar fields overwrite unconditionally; reference fields are only
    /// re-resolved when the payload provides them. The participant counter
    /// is never touched here, but the new seat limit must not undercut it.
    pub async fn update(&self, id: &str, update: CourseUpdate) -> DbResult<Course> {
        validate_name("name", &update.name)?;
        validate_max_participants(update.max_participants)?;
        validate_date_range(update.start_date, update.end_date)?;

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::CourseNotFound(id.to_string()))?;

        if update.max_participants < existing.current_participants {
            return Err(ValidationError::OutOfRange {
                field: "max_participants".to_string(),
                min: existing.current_participants,
                max: MAX_COURSE_CAPACITY,
            }
            .into());
        }

        // Partial reference update: only provided refs are re-resolved
        let course_type_id = match update.course_type_id {
            Some(course_type_id) => {
                self.require_course_type(&course_type_id).await?;
                course_type_id
            }
            None => existing.course_type_id,
        };
        let room_id = match update.room_id {
            Some(room_id) => {
                self.require_room(&room_id).await?;
                room_id
            }
            None => existing.room_id,
        };
        let trainer_id = match update.trainer_id {
            Some(trainer_id) => {
                self.require_trainer(&trainer_id).await?;
                trainer_id
            }
            None => existing.trainer_id,
        };

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE courses SET name = ?2, course_type_id = ?3, room_id = ?4,
                               trainer_id = ?5, start_date = ?6, end_date = ?7,
                               max_participants = ?8, status = ?9,
                               description = ?10, updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&course_type_id)
        .bind(&room_id)
        .bind(&trainer_id)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(update.max_participants)
        .bind(update.status)
        .bind(&update.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Course {
            id: id.to_string(),
            name: update.name,
            course_type_id,
            room_id,
            trainer_id,
            start_date: update.start_date,
            end_date: update.end_date,
            max_participants: update.max_participants,
            current_participants: existing.current_participants,
            status: update.status,
            description: update.description,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Overwrites a course's status, with no transition validation.
    pub async fn set_status(&self, id: &str, status: CourseStatus) -> DbResult<Course> {
        let now = Utc::now();
        let result = sqlx::query("UPDATE courses SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CourseNotFound(id.to_string()).into());
        }

        debug!(id = %id, status = ?status, "Updated course status");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Course", id))
    }

    /// Cancels a course instead of deleting it.
    ///
    /// Sets status to `cancelled` and deactivates the course's active
    /// schedule slots in the same transaction. Enrollments stay untouched
    /// as history.
    pub async fn cancel(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE courses SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(CourseStatus::Cancelled)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CourseNotFound(id.to_string()).into());
        }

        sqlx::query("UPDATE schedule_slots SET is_active = 0 WHERE course_id = ?1 AND is_active = 1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %id, "Cancelled course");
        Ok(())
    }

    // =========================================================================
    // Reference checks
    // =========================================================================

    async fn require_course_type(&self, course_type_id: &str) -> DbResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM course_types WHERE id = ?1")
            .bind(course_type_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(CoreError::CourseTypeNotFound(course_type_id.to_string()).into());
        }
        Ok(())
    }

    async fn require_room(&self, room_id: &str) -> DbResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM rooms WHERE id = ?1")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(CoreError::RoomNotFound(room_id.to_string()).into());
        }
        Ok(())
    }

    async fn require_trainer(&self, trainer_id: &str) -> DbResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM trainers WHERE id = ?1")
            .bind(trainer_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(CoreError::TrainerNotFound(trainer_id.to_string()).into());
        }
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
    use lingua_core::NewScheduleSlot;
    use lingua_core::Weekday;
    use chrono::NaiveTime;

    fn new_course(ctx: &crate::testutil::TestContext, name: &str) -> NewCourse {
        NewCourse {
            name: name.to_string(),
            course_type_id: ctx.course_type_id.clone(),
            room_id: ctx.room_id.clone(),
            trainer_id: ctx.trainer_id.clone(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: None,
            max_participants: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn insert_applies_defaults() {
        let ctx = testutil::context().await;

        let course = ctx
            .db
            .courses()
            .insert(new_course(&ctx, "A1 Morning"))
            .await
            .unwrap();

        assert_eq!(course.max_participants, 12);
        assert_eq!(course.current_participants, 0);
        assert_eq!(course.status, CourseStatus::Planned);
    }

    #[tokio::test]
    async fn end_date_must_be_after_start_date() {
        let ctx = testutil::context().await;
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let mut new = new_course(&ctx, "A1 Morning");
        new.end_date = Some(start); // equal, not after

        let err = ctx.db.courses().insert(new).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidDateRange { .. })
        ));
    }

    #[tokio::test]
    async fn missing_trainer_reference_is_not_found() {
        let ctx = testutil::context().await;

        let mut new = new_course(&ctx, "A1 Morning");
        new.trainer_id = "missing".to_string();

        let err = ctx.db.courses().insert(new).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::TrainerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn capacity_out_of_bounds_is_rejected() {
        let ctx = testutil::context().await;

        let mut new = new_course(&ctx, "A1 Morning");
        new.max_participants = Some(51);

        let err = ctx.db.courses().insert(new).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn set_status_is_unconditional() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let courses = ctx.db.courses();

        courses
            .set_status(&course.id, CourseStatus::Completed)
            .await
            .unwrap();

        // completed → planned is permitted: no transition graph
        let back = courses
            .set_status(&course.id, CourseStatus::Planned)
            .await
            .unwrap();
        assert_eq!(back.status, CourseStatus::Planned);
    }

    #[tokio::test]
    async fn update_keeps_unprovided_references() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;

        let updated = ctx
            .db
            .courses()
            .update(
                &course.id,
                CourseUpdate {
                    name: "A1 Evening".to_string(),
                    start_date: course.start_date,
                    end_date: course.end_date,
                    max_participants: 15,
                    status: CourseStatus::Running,
                    description: None,
                    course_type_id: None,
                    room_id: None,
                    trainer_id: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "A1 Evening");
        assert_eq!(updated.trainer_id, course.trainer_id);
        assert_eq!(updated.room_id, course.room_id);
        assert_eq!(updated.max_participants, 15);
    }

    #[tokio::test]
    async fn update_cannot_undercut_the_counter() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 5).await;
        let enrollments = ctx.db.enrollments();

        let a = ctx.student("Anna", "Schmidt").await;
        let b = ctx.student("Omar", "Haddad").await;
        enrollments.enroll(&a.id, &course.id).await.unwrap();
        enrollments.enroll(&b.id, &course.id).await.unwrap();

        let err = ctx
            .db
            .courses()
            .update(
                &course.id,
                CourseUpdate {
                    name: course.name.clone(),
                    start_date: course.start_date,
                    end_date: course.end_date,
                    max_participants: 1, // below current_participants = 2
                    status: CourseStatus::Planned,
                    description: None,
                    course_type_id: None,
                    room_id: None,
                    trainer_id: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn availability_requires_open_seats_and_planned_status() {
        let ctx = testutil::context().await;
        let open = ctx.course("A1 Morning", 2).await;
        let full = ctx.course("A1 Noon", 1).await;
        let running = ctx.course("A1 Evening", 12).await;
        let courses = ctx.db.courses();

        let student = ctx.student("Anna", "Schmidt").await;
        ctx.db.enrollments().enroll(&student.id, &full.id).await.unwrap();
        courses
            .set_status(&running.id, CourseStatus::Running)
            .await
            .unwrap();

        let available = courses.list_available().await.unwrap();
        let ids: Vec<&str> = available.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![open.id.as_str()]);
    }

    #[tokio::test]
    async fn cancel_deactivates_schedule_slots() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;

        ctx.db
            .schedule()
            .insert(NewScheduleSlot {
                course_id: course.id.clone(),
                weekday: Weekday::Monday,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                remarks: None,
            })
            .await
            .unwrap();

        ctx.db.courses().cancel(&course.id).await.unwrap();

        let course = ctx.db.courses().get_by_id(&course.id).await.unwrap().unwrap();
        assert_eq!(course.status, CourseStatus::Cancelled);

        let slots = ctx.db.schedule().list_by_course(&course.id).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert!(!slots[0].is_active);
    }

    #[tokio::test]
    async fn list_starting_between_is_inclusive() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;

        let hits = ctx
            .db
            .courses()
            .list_starting_between(course.start_date, course.start_date)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }
}
