//! # Validation Module
//!
//! Field-level validation for Lingua.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: REST adapter                                                 │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Basic format checks for immediate feedback                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by repositories before persisting)       │
//! │  ├── Required/length/range rules                                       │
//! │  └── Cross-field range rules (date range, time range)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cross-field validators replace the original system's
//! annotation-driven field-pair introspection with direct comparisons the
//! repositories call explicitly.

use chrono::{NaiveDate, NaiveTime};

use crate::error::{CoreError, ValidationError};
use crate::{DEFAULT_MAX_PARTICIPANTS, MAX_COURSE_CAPACITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity display name (course, department, room, person).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use lingua_core::validation::validate_name;
///
/// assert!(validate_name("name", "Deutsch A1 Morgenkurs").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a course-type code (e.g. "A1", "B2-INT").
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 20 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_course_type_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 20,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address when one is provided.
///
/// Intentionally shallow: one `@` with something on both sides. Deliverability
/// is not a storage-layer concern.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 255,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected local@domain".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a course's seat limit.
///
/// ## Rules
/// - Between 1 and [`MAX_COURSE_CAPACITY`] inclusive
///
/// ## Example
/// ```rust
/// use lingua_core::validation::validate_max_participants;
///
/// assert!(validate_max_participants(12).is_ok());
/// assert!(validate_max_participants(0).is_err());
/// assert!(validate_max_participants(51).is_err());
/// ```
pub fn validate_max_participants(max: i64) -> ValidationResult<()> {
    if !(1..=MAX_COURSE_CAPACITY).contains(&max) {
        return Err(ValidationError::OutOfRange {
            field: "max_participants".to_string(),
            min: 1,
            max: MAX_COURSE_CAPACITY,
        });
    }
    Ok(())
}

/// Validates a final grade on the German 1.0 (best) to 6.0 scale.
pub fn validate_final_grade(grade: f64) -> ValidationResult<()> {
    if !(1.0..=6.0).contains(&grade) {
        return Err(ValidationError::OutOfRange {
            field: "final_grade".to_string(),
            min: 1,
            max: 6,
        });
    }
    Ok(())
}

// =============================================================================
// Range Validators
// =============================================================================

/// Validates that a course's end date is strictly after its start date.
///
/// A missing end date (open-ended course) is always valid.
pub fn validate_date_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), CoreError> {
    if let Some(end) = end {
        if end <= start {
            return Err(CoreError::InvalidDateRange { start, end });
        }
    }
    Ok(())
}

/// Validates that a schedule slot's end time is strictly after its start time.
pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), CoreError> {
    if end <= start {
        return Err(CoreError::InvalidTimeRange { start, end });
    }
    Ok(())
}

/// Resolves the effective seat limit for a new course.
pub fn effective_max_participants(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_MAX_PARTICIPANTS)
}

// =============================================================================
// Unit Tests
// =============================================================================
