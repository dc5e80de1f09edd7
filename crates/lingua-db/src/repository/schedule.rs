//! # Schedule Repository
//!
//! Weekly time-slot assignment with overlap detection per course/weekday.
//!
//! ## Conflict Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 insert(slot for course C, monday)                       │
//! │                                                                         │
//! │  Load ACTIVE slots of course C on monday                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Any boundary-inclusive overlap with the new interval?                 │
//! │       │                                                                 │
//! │       ├── yes ──► ScheduleConflict (nothing written)                   │
//! │       └── no  ──► INSERT                                               │
//! │                                                                         │
//! │  update() re-validates the time range but does NOT re-run this scan -  │
//! │  an asymmetry inherited from the reference behavior and kept on        │
//! │  purpose; see DESIGN.md.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lingua_core::schedule::find_conflict;
use lingua_core::validation::validate_time_range;
use lingua_core::{CoreError, NewScheduleSlot, ScheduleSlot, ScheduleSlotUpdate, Weekday};

const SLOT_COLUMNS: &str = r#"
    id, course_id, weekday, start_time, end_time, remarks, is_active, created_at
"#;

/// Repository for schedule-slot database operations.
#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    pool: SqlitePool,
}

impl ScheduleRepository {
    /// Creates a new ScheduleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ScheduleRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a new schedule slot after checking for conflicts.
    ///
    /// ## Errors
    /// - `InvalidTimeRange` when end is not after start
    /// - `CourseNotFound` for a missing course reference
    /// - `ScheduleConflict` when an active slot of the same course and
    ///   weekday overlaps (boundary-inclusive: back-to-back slots conflict)
    pub async fn insert(&self, new: NewScheduleSlot) -> DbResult<ScheduleSlot> {
        validate_time_range(new.start_time, new.end_time)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let course_exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM courses WHERE id = ?1")
            .bind(&new.course_id)
            .fetch_optional(&mut *tx)
            .await?;
        if course_exists.is_none() {
            return Err(CoreError::CourseNotFound(new.course_id).into());
        }

        let siblings = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM schedule_slots \
             WHERE course_id = ?1 AND weekday = ?2 AND is_active = 1"
        ))
        .bind(&new.course_id)
        .bind(new.weekday)
        .fetch_all(&mut *tx)
        .await?;

        if find_conflict(new.start_time, new.end_time, &siblings).is_some() {
            return Err(CoreError::ScheduleConflict {
                course_id: new.course_id,
                weekday: new.weekday,
            }
            .into());
        }

        let slot = ScheduleSlot {
            id: Uuid::new_v4().to_string(),
            course_id: new.course_id,
            weekday: new.weekday,
            start_time: new.start_time,
            end_time: new.end_time,
            remarks: new.remarks,
            is_active: true,
            created_at: now,
        };

        debug!(id = %slot.id, course_id = %slot.course_id, weekday = %slot.weekday, "Inserting schedule slot");

        sqlx::query(
            r#"
            INSERT INTO schedule_slots (id, course_id, weekday, start_time, end_time,
                                        remarks, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&slot.id)
        .bind(&slot.course_id)
        .bind(slot.weekday)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(&slot.remarks)
        .bind(slot.is_active)
        .bind(slot.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %slot.id, course_id = %slot.course_id, "Created schedule slot");
        Ok(slot)
    }

    /// Updates a schedule slot.
    ///
    /// Re-validates the time range. Does NOT re-run conflict detection
    /// against sibling slots - the asymmetry with [`Self::insert`] is
    /// preserved reference behavior (see DESIGN.md).
    pub async fn update(&self, id: &str, update: ScheduleSlotUpdate) -> DbResult<ScheduleSlot> {
        validate_time_range(update.start_time, update.end_time)?;

        let result = sqlx::query(
            r#"
            UPDATE schedule_slots SET weekday = ?2, start_time = ?3, end_time = ?4,
                                      remarks = ?5, is_active = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.weekday)
        .bind(update.start_time)
        .bind(update.end_time)
        .bind(&update.remarks)
        .bind(update.is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ScheduleSlotNotFound(id.to_string()).into());
        }

        debug!(id = %id, "Updated schedule slot");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Schedule slot", id))
    }

    /// Soft-deletes a schedule slot.
    ///
    /// Courses left without any active slot are not warned about; the
    /// schedule view simply shows none.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE schedule_slots SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ScheduleSlotNotFound(id.to_string()).into());
        }

        info!(id = %id, "Soft-deleted schedule slot");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lists all active schedule slots.
    pub async fn list_active(&self) -> DbResult<Vec<ScheduleSlot>> {
        let slots = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM schedule_slots \
             WHERE is_active = 1 ORDER BY course_id, start_time"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    /// Gets a schedule slot by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ScheduleSlot>> {
        let slot = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM schedule_slots WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    /// Lists a course's schedule slots, tombstones included.
    pub async fn list_by_course(&self, course_id: &str) -> DbResult<Vec<ScheduleSlot>> {
        let slots = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM schedule_slots \
             WHERE course_id = ?1 ORDER BY start_time"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    /// Lists all slots on a weekday, across courses.
    pub async fn list_by_weekday(&self, weekday: Weekday) -> DbResult<Vec<ScheduleSlot>> {
        let slots = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM schedule_slots \
             WHERE weekday = ?1 ORDER BY start_time"
        ))
        .bind(weekday)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(course_id: &str, weekday: Weekday, start: NaiveTime, end: NaiveTime) -> NewScheduleSlot {
        NewScheduleSlot {
            course_id: course_id.to_string(),
            weekday,
            start_time: start,
            end_time: end,
            remarks: None,
        }
    }

    #[tokio::test]
    async fn end_time_must_be_after_start_time() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;

        let err = ctx
            .db
            .schedule()
            .insert(slot(&course.id, Weekday::Monday, t(11, 0), t(9, 0)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidTimeRange { .. })
        ));
    }

    #[tokio::test]
    async fn back_to_back_slots_conflict() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let schedule = ctx.db.schedule();

        schedule
            .insert(slot(&course.id, Weekday::Monday, t(9, 0), t(11, 0)))
            .await
            .unwrap();

        // new.start == existing.end: boundary-inclusive, rejected
        let err = schedule
            .insert(slot(&course.id, Weekday::Monday, t(11, 0), t(12, 0)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ScheduleConflict { .. })
        ));

        // new.end == existing.start: also rejected
        let err = schedule
            .insert(slot(&course.id, Weekday::Monday, t(8, 0), t(9, 0)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ScheduleConflict { .. })
        ));
    }

    #[tokio::test]
    async fn other_weekdays_and_courses_do_not_conflict() {
        let ctx = testutil::context().await;
        let first = ctx.course("A1 Morning", 12).await;
        let second = ctx.course("B1 Morning", 12).await;
        let schedule = ctx.db.schedule();

        schedule
            .insert(slot(&first.id, Weekday::Monday, t(9, 0), t(11, 0)))
            .await
            .unwrap();

        // Same course, different weekday
        schedule
            .insert(slot(&first.id, Weekday::Tuesday, t(9, 0), t(11, 0)))
            .await
            .unwrap();

        // Same weekday and times, different course
        schedule
            .insert(slot(&second.id, Weekday::Monday, t(9, 0), t(11, 0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deleted_slots_stop_conflicting() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let schedule = ctx.db.schedule();

        let morning = schedule
            .insert(slot(&course.id, Weekday::Monday, t(9, 0), t(11, 0)))
            .await
            .unwrap();
        schedule.delete(&morning.id).await.unwrap();

        // The tombstone no longer blocks the interval
        schedule
            .insert(slot(&course.id, Weekday::Monday, t(9, 0), t(11, 0)))
            .await
            .unwrap();

        // But it is still visible in the per-course listing
        let all = schedule.list_by_course(&course.id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().filter(|s| s.is_active).count(), 1);
        assert_eq!(schedule.list_active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_revalidates_the_time_range() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let schedule = ctx.db.schedule();

        let created = schedule
            .insert(slot(&course.id, Weekday::Monday, t(9, 0), t(11, 0)))
            .await
            .unwrap();

        let err = schedule
            .update(
                &created.id,
                ScheduleSlotUpdate {
                    weekday: Weekday::Monday,
                    start_time: t(11, 0),
                    end_time: t(11, 0),
                    remarks: None,
                    is_active: true,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidTimeRange { .. })
        ));
    }

    #[tokio::test]
    async fn update_does_not_rerun_conflict_detection() {
        let ctx = testutil::context().await;
        let course = ctx.course("A1 Morning", 12).await;
        let schedule = ctx.db.schedule();

        schedule
            .insert(slot(&course.id, Weekday::Monday, t(9, 0), t(11, 0)))
            .await
            .unwrap();
        let afternoon = schedule
            .insert(slot(&course.id, Weekday::Monday, t(14, 0), t(16, 0)))
            .await
            .unwrap();

        // Moving the afternoon slot onto the morning one succeeds: update
        // skips the sibling scan (preserved reference behavior)
        let moved = schedule
            .update(
                &afternoon.id,
                ScheduleSlotUpdate {
                    weekday: Weekday::Monday,
                    start_time: t(10, 0),
                    end_time: t(12, 0),
                    remarks: None,
                    is_active: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.start_time, t(10, 0));
    }

    #[tokio::test]
    async fn delete_of_missing_slot_is_not_found() {
        let ctx = testutil::context().await;

        let err = ctx.db.schedule().delete("missing").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ScheduleSlotNotFound(_))
        ));
    }

    #[tokio::test]
    async fn weekday_listing_spans_courses() {
        let ctx = testutil::context().await;
        let first = ctx.course("A1 Morning", 12).await;
        let second = ctx.course("B1 Morning", 12).await;
        let schedule = ctx.db.schedule();

        schedule
            .insert(slot(&first.id, Weekday::Friday, t(9, 0), t(11, 0)))
            .await
            .unwrap();
        schedule
            .insert(slot(&second.id, Weekday::Friday, t(12, 0), t(14, 0)))
            .await
            .unwrap();

        let friday = schedule.list_by_weekday(Weekday::Friday).await.unwrap();
        assert_eq!(friday.len(), 2);
        assert!(schedule
            .list_by_weekday(Weekday::Sunday)
            .await
            .unwrap()
            .is_empty());
    }
}
