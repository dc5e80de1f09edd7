//! # Repository Implementations
//!
//! One repository per aggregate. Each repository owns a pool handle and runs
//! every invariant-bearing write inside a single transaction.
//!
//! ## Repository Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Repositories                                     │
//! │                                                                         │
//! │  directory.rs   DepartmentRepository / RoomRepository /                │
//! │                 CourseTypeRepository  - reference data, soft deletes   │
//! │  trainer.rs     TrainerRepository     - directory + availability       │
//! │  student.rs     StudentRepository     - directory + search             │
//! │  course.rs      CourseRepository      - registry, status, capacity     │
//! │  enrollment.rs  EnrollmentRepository  - state machine + counter        │
//! │  attendance.rs  AttendanceRepository  - per-date upsert + statistics   │
//! │  schedule.rs    ScheduleRepository    - weekly slots + conflict check  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod attendance;
pub mod course;
pub mod directory;
pub mod enrollment;
pub mod schedule;
pub mod student;
pub mod trainer;
