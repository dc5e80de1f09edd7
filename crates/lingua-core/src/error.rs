//! # Error Types
//!
//! Domain-specific error types for lingua-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lingua-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lingua-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                        (wraps CoreError transparently, so business     │
//! │                         failures stay matchable at the repo boundary)  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → REST adapter → Client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, bounds, dates)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to one caller-visible error kind:
//!    NotFound, Conflict, CapacityExceeded, InvalidRange, ValidationFailed

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::types::Weekday;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or missing references.
/// They are surfaced directly to the caller as distinct kinds - never
/// silently swallowed (the one exception is bulk attendance recording,
/// where per-entry failures are logged and skipped by design).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Department cannot be found.
    #[error("Department not found: {0}")]
    DepartmentNotFound(String),

    /// Room cannot be found.
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Course type cannot be found.
    #[error("Course type not found: {0}")]
    CourseTypeNotFound(String),

    /// Trainer cannot be found.
    #[error("Trainer not found: {0}")]
    TrainerNotFound(String),

    /// Student cannot be found, or exists but is deactivated.
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    /// Course cannot be found.
    #[error("Course not found: {0}")]
    CourseNotFound(String),

    /// Schedule slot cannot be found.
    #[error("Schedule slot not found: {0}")]
    ScheduleSlotNotFound(String),

    /// No enrollment row exists for the (student, course) pair.
    #[error("Enrollment not found for student {student_id} in course {course_id}")]
    NotEnrolled {
        student_id: String,
        course_id: String,
    },

    /// An enrollment row already exists for the (student, course) pair.
    ///
    /// ## When This Occurs
    /// - Enrolling a student twice in the same course
    /// - Re-enrolling after a withdrawal: the withdrawn row still exists
    ///   and blocks the pair (current policy - see DESIGN.md)
    #[error("Student {student_id} is already enrolled in course {course_id}")]
    AlreadyEnrolled {
        student_id: String,
        course_id: String,
    },

    /// Course has no open seats left.
    ///
    /// ## When This Occurs
    /// - `current_participants` has reached `max_participants`
    /// - The guarded counter update matched no row, so nothing was written
    ///
    /// ## User Workflow
    /// ```text
    /// enroll(student, course)
    ///      │
    ///      ▼
    /// UPDATE ... WHERE current_participants < max_participants
    ///      │  rows_affected == 0
    ///      ▼
    /// CourseFull { course_id, max_participants: 12 }
    ///      │
    ///      ▼
    /// UI shows: "Course is full (12 seats)"
    /// ```
    #[error("Course {course_id} is at maximum capacity ({max_participants})")]
    CourseFull {
        course_id: String,
        max_participants: i64,
    },

    /// A schedule slot overlaps an existing active slot.
    ///
    /// The overlap rule is boundary-inclusive: a slot starting exactly when
    /// another ends still conflicts.
    #[error("Time conflict for course {course_id} on {weekday}")]
    ScheduleConflict {
        course_id: String,
        weekday: Weekday,
    },

    /// End date is not after start date.
    #[error("Invalid date range: end {end} must be after start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// End time is not after start time.
    #[error("Invalid time range: end {end} must be after start {start}")]
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet field-level
/// requirements. Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid email, invalid code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate course-type code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
