//! # Domain Types
//!
//! Core domain types used throughout Lingua.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Reference data            Registry               Consistency core     │
//! │  ┌───────────────┐   ┌─────────────────┐   ┌─────────────────────┐    │
//! │  │  Department   │   │     Course      │   │     Enrollment      │    │
//! │  │  Room         │   │  ─────────────  │   │  ─────────────────  │    │
//! │  │  CourseType   │   │  max/current    │   │  status lifecycle   │    │
//! │  │  Trainer      │   │  participants   │   │  (student, course)  │    │
//! │  │  Student      │   │  status         │   │  unique pair        │    │
//! │  └───────────────┘   └─────────────────┘   ├─────────────────────┤    │
//! │                                            │  AttendanceRecord   │    │
//! │  All reference rows are soft-deleted       │  ScheduleSlot       │    │
//! │  via boolean flags, never removed.         └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has an `id: String` (UUID v4), immutable, generated by the
//! repository layer on insert. Status enums are stored as lowercase text and
//! serialize to the same strings over the wire.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Status Enums
// =============================================================================

/// Lifecycle status of a course.
///
/// Transitions are NOT validated: `set_status` overwrites unconditionally
/// (e.g. completed → planned is permitted). This is intentional flexibility
/// for back-office corrections, not an oversight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    /// Course is announced but has not started.
    Planned,
    /// Course is in progress.
    Running,
    /// Course finished regularly.
    Completed,
    /// Course was cancelled.
    Cancelled,
}

impl Default for CourseStatus {
    fn default() -> Self {
        CourseStatus::Planned
    }
}

/// Lifecycle status of an enrollment.
///
/// ## State Machine
/// ```text
/// registered ──► active ──► completed
///     │            │
///     └────────────┴──────► withdrawn
/// ```
/// The happy path is registered → active → completed; withdrawal is allowed
/// from registered or active. No transition graph is enforced at this layer
/// (policy decision left to the caller) - the enrollment repository's
/// `set_status` accepts any status from any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    /// Student registered for the course (initial state).
    Registered,
    /// Student is actively attending.
    Active,
    /// Student finished the course.
    Completed,
    /// Student withdrew before completion.
    Withdrawn,
}

impl Default for EnrollmentStatus {
    fn default() -> Self {
        EnrollmentStatus::Registered
    }
}

impl EnrollmentStatus {
    /// Whether this status counts toward the current roster.
    ///
    /// Completed/withdrawn rows stay in the table as history but are
    /// excluded from "who is in this course right now" views.
    pub const fn is_current(&self) -> bool {
        matches!(self, EnrollmentStatus::Registered | EnrollmentStatus::Active)
    }
}

/// Availability status of a trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TrainerStatus {
    /// Free to take on courses.
    Available,
    /// Currently assigned to courses.
    Deployed,
    /// On leave or otherwise absent.
    Absent,
}

impl Default for TrainerStatus {
    fn default() -> Self {
        TrainerStatus::Available
    }
}

/// Gender of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Diverse,
}

/// Day of week for a recurring schedule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Reference Data
// =============================================================================

/// An organizational unit owning rooms and trainers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Soft-delete flag; inactive rows are hidden from listings.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A course room, belonging to a department.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Room {
    pub id: String,
    pub department_id: String,
    pub name: String,
    /// Physical seat count; independent of any course's max_participants.
    pub capacity: i64,
    pub equipment: Option<String>,
    pub is_available: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A level/category template (e.g. "A1") that courses instantiate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CourseType {
    pub id: String,
    /// Business identifier, unique across all course types (e.g. "B2").
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Ordering key for level progression (A1 < A2 < B1 ...).
    pub level_order: Option<i64>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A trainer employed by a department.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Trainer {
    pub id: String,
    pub department_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Unique across trainers when present.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: TrainerStatus,
    pub qualifications: Option<String>,
    #[ts(as = "Option<String>")]
    pub hire_date: Option<NaiveDate>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A learner who may enroll in courses (Teilnehmer).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub nationality: Option<String>,
    pub native_language: Option<String>,
    #[ts(as = "String")]
    pub registration_date: NaiveDate,
    /// Soft-delete flag. Inactive students cannot enroll; their history
    /// (enrollments, attendance) is preserved.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Course
// =============================================================================

/// A scheduled offering of a course type, bound to a room and trainer.
///
/// ## Capacity Invariant
/// `0 <= current_participants <= max_participants` holds at all times.
/// `current_participants` is a materialized counter maintained by the
/// enrollment repository inside the same transaction as every enrollment
/// write - it is never recomputed from enrollment rows on the read path.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub course_type_id: String,
    pub room_id: String,
    pub trainer_id: String,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    /// When set, must be strictly after `start_date`.
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    /// Seat limit, 1..=50 (defaults to 12).
    pub max_participants: i64,
    /// Materialized enrollment counter, 0..=max_participants.
    pub current_participants: i64,
    pub status: CourseStatus,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Whether the course still has open seats.
    ///
    /// This is the definition availability queries and the enrollment
    /// capacity check share: strictly fewer current participants than the
    /// maximum.
    pub const fn has_open_seats(&self) -> bool {
        self.current_participants < self.max_participants
    }
}

// =============================================================================
// Enrollment
// =============================================================================

/// The join entity recording a student's participation in a course
/// (TeilnehmerKurs).
///
/// At most one row exists per (student, course) pair at any time; the
/// existing row is updated, never duplicated. Rows are never physically
/// deleted - `status` is the deletion marker.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    #[ts(as = "String")]
    pub registration_date: NaiveDate,
    /// Set when the enrollment leaves the roster (withdrawn or completed).
    #[ts(as = "Option<String>")]
    pub withdrawal_date: Option<NaiveDate>,
    pub status: EnrollmentStatus,
    /// Final grade on the 1.0 (best) to 6.0 scale, set on completion.
    pub final_grade: Option<f64>,
    pub remarks: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Attendance
// =============================================================================

/// A per-date presence/absence entry for a student in a course
/// (Anwesenheit).
///
/// Logically keyed by (student, course, date): recording for an existing
/// triple updates the row in place. `recorded_at` is set once on insert and
/// never touched again.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub present: bool,
    /// Only meaningful when `present` is false.
    pub excused: bool,
    pub remark: Option<String>,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
}

/// One entry of a bulk attendance submission (per-student part; course and
/// date come from the batch).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttendanceEntry {
    pub student_id: String,
    pub present: bool,
    #[serde(default)]
    pub excused: bool,
    pub remark: Option<String>,
}

// =============================================================================
// Schedule
// =============================================================================

/// A recurring weekly time block assigned to a course (Stundenplan).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ScheduleSlot {
    pub id: String,
    pub course_id: String,
    pub weekday: Weekday,
    #[ts(as = "String")]
    pub start_time: NaiveTime,
    /// Must be strictly after `start_time`.
    #[ts(as = "String")]
    pub end_time: NaiveTime,
    pub remarks: Option<String>,
    /// Soft-delete flag; only active slots participate in conflict checks.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Input Types
// =============================================================================
// Creation/update payloads as the REST adapter hands them to the
// repositories. Ids and audit timestamps are generated by the repository
// layer, so these carry business fields only.

/// Payload for creating a department.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDepartment {
    pub name: String,
    pub description: Option<String>,
}

/// Payload for creating a room.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRoom {
    pub department_id: String,
    pub name: String,
    /// Defaults to [`crate::DEFAULT_ROOM_CAPACITY`] when omitted.
    pub capacity: Option<i64>,
    pub equipment: Option<String>,
}

/// Payload for creating a course type.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCourseType {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub level_order: Option<i64>,
}

/// Payload for creating a trainer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTrainer {
    pub department_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Defaults to [`TrainerStatus::Available`] when omitted.
    pub status: Option<TrainerStatus>,
    pub qualifications: Option<String>,
    #[ts(as = "Option<String>")]
    pub hire_date: Option<NaiveDate>,
}

/// Payload for creating a student.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub nationality: Option<String>,
    pub native_language: Option<String>,
    /// Defaults to today when omitted.
    #[ts(as = "Option<String>")]
    pub registration_date: Option<NaiveDate>,
}

/// Payload for updating a trainer (full overwrite of business fields).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrainerUpdate {
    pub department_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: TrainerStatus,
    pub qualifications: Option<String>,
    #[ts(as = "Option<String>")]
    pub hire_date: Option<NaiveDate>,
}

/// Payload for updating a student (full overwrite of business fields).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StudentUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub nationality: Option<String>,
    pub native_language: Option<String>,
    #[ts(as = "String")]
    pub registration_date: NaiveDate,
}

/// Payload for creating a course.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCourse {
    pub name: String,
    pub course_type_id: String,
    pub room_id: String,
    pub trainer_id: String,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    /// Defaults to [`crate::DEFAULT_MAX_PARTICIPANTS`] when omitted.
    pub max_participants: Option<i64>,
    pub description: Option<String>,
}

/// Payload for updating a course.
///
/// Scalar fields overwrite unconditionally; reference fields are
/// re-resolved only when provided (partial reference update).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CourseUpdate {
    pub name: String,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    pub max_participants: i64,
    pub status: CourseStatus,
    pub description: Option<String>,
    pub course_type_id: Option<String>,
    pub room_id: Option<String>,
    pub trainer_id: Option<String>,
}

/// Payload for creating a schedule slot.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewScheduleSlot {
    pub course_id: String,
    pub weekday: Weekday,
    #[ts(as = "String")]
    pub start_time: NaiveTime,
    #[ts(as = "String")]
    pub end_time: NaiveTime,
    pub remarks: Option<String>,
}

/// Payload for updating a schedule slot.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScheduleSlotUpdate {
    pub weekday: Weekday,
    #[ts(as = "String")]
    pub start_time: NaiveTime,
    #[ts(as = "String")]
    pub end_time: NaiveTime,
    pub remarks: Option<String>,
    pub is_active: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn course_with_counts(current: i64, max: i64) -> Course {
        Course {
            id: "c-1".to_string(),
            name: "A1 Morning".to_string(),
            course_type_id: "ct-1".to_string(),
            room_id: "r-1".to_string(),
            trainer_id: "t-1".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: None,
            max_participants: max,
            current_participants: current,
            status: CourseStatus::default(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_course_status_default() {
        assert_eq!(CourseStatus::default(), CourseStatus::Planned);
    }

    #[test]
    fn test_enrollment_status_default() {
        assert_eq!(EnrollmentStatus::default(), EnrollmentStatus::Registered);
    }

    #[test]
    fn test_enrollment_status_is_current() {
        assert!(EnrollmentStatus::Registered.is_current());
        assert!(EnrollmentStatus::Active.is_current());
        assert!(!EnrollmentStatus::Completed.is_current());
        assert!(!EnrollmentStatus::Withdrawn.is_current());
    }

    #[test]
    fn test_has_open_seats() {
        assert!(course_with_counts(0, 12).has_open_seats());
        assert!(course_with_counts(11, 12).has_open_seats());
        assert!(!course_with_counts(12, 12).has_open_seats());
    }

    #[test]
    fn test_enum_wire_values_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&CourseStatus::Planned).unwrap(),
            "\"planned\""
        );
        assert_eq!(
            serde_json::to_string(&EnrollmentStatus::Withdrawn).unwrap(),
            "\"withdrawn\""
        );
        assert_eq!(
            serde_json::to_string(&Weekday::Wednesday).unwrap(),
            "\"wednesday\""
        );
    }

    #[test]
    fn test_weekday_display() {
        assert_eq!(Weekday::Monday.to_string(), "monday");
        assert_eq!(Weekday::Sunday.to_string(), "sunday");
    }
}
