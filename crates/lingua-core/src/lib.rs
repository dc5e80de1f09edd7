//! # lingua-core: Pure Business Logic for Lingua
//!
//! This crate is the **heart** of the Lingua course-administration backend.
//! It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lingua Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  REST Adapter (external)                        │   │
//! │  │    routing ──► auth ──► DTO mapping ──► repository calls       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lingua-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │ validation│  │ attendance │  │ schedule  │ │   │
//! │  │   │  Course   │  │   rules   │  │   stats    │  │  overlap  │ │   │
//! │  │   │ Enrollment│  │  checks   │  │   math     │  │   math    │ │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lingua-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Course, Student, Enrollment, etc.)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`attendance`] - Attendance statistics aggregation
//! - [`schedule`] - Schedule overlap detection
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Counter Discipline**: The participant counter on [`types::Course`] is
//!    only ever adjusted together with an enrollment write, in one transaction

// =============================================================================
// Module Declarations
// =============================================================================

pub mod attendance;
pub mod error;
pub mod schedule;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lingua_core::Course` instead of
// `use lingua_core::types::Course`

pub use attendance::AttendanceStats;
pub use error::{CoreError, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default maximum number of participants for a newly created course.
pub const DEFAULT_MAX_PARTICIPANTS: i64 = 12;

/// Hard upper bound on course capacity.
///
/// Language courses are taught in small groups; anything above this is a
/// data-entry mistake, not a real class.
pub const MAX_COURSE_CAPACITY: i64 = 50;

/// Default capacity for a newly created room.
pub const DEFAULT_ROOM_CAPACITY: i64 = 12;
