//! # lingua-db: Database Layer for Lingua
//!
//! This crate provides database access for the Lingua course-administration
//! backend. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lingua Data Flow                                 │
//! │                                                                         │
//! │  REST adapter (POST /courses/enroll)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     lingua-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ Enrollment    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Course        │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ Attendance    │    │              │  │   │
//! │  │   │ Management    │    │ Schedule ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (one write transaction per operation)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (enrollment, course, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lingua_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/lingua.db");
//! let db = Database::new(config).await?;
//!
//! // The enrollment write and the counter bump share one transaction
//! let enrollment = db.enrollments().enroll(&student_id, &course_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::attendance::AttendanceRepository;
pub use repository::course::CourseRepository;
pub use repository::directory::{CourseTypeRepository, DepartmentRepository, RoomRepository};
pub use repository::enrollment::EnrollmentRepository;
pub use repository::schedule::ScheduleRepository;
pub use repository::student::StudentRepository;
pub use repository::trainer::TrainerRepository;
