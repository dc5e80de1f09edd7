//! # Attendance Statistics
//!
//! Pure aggregation over attendance records.
//!
//! ## The Partition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Every record falls in exactly one bucket                │
//! │                                                                         │
//! │   present = true  ──────────────────────────────► present_days         │
//! │   present = false, excused = true  ─────────────► excused_days         │
//! │   present = false, excused = false ─────────────► unexcused_days       │
//! │                                                                         │
//! │   present_days + excused_days + unexcused_days == total_days (always)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The repository fetches the records for a (student, course) pair and hands
//! them to [`AttendanceStats::from_records`]; no SQL aggregation involved.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::AttendanceRecord;

// =============================================================================
// Attendance Stats
// =============================================================================

/// Aggregated attendance figures for one student in one course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttendanceStats {
    /// Count of all records, regardless of presence.
    pub total_days: i64,
    /// Records with `present = true`.
    pub present_days: i64,
    /// Absent but excused.
    pub excused_days: i64,
    /// Absent and unexcused.
    pub unexcused_days: i64,
    /// `present_days / total_days × 100`, rounded to 2 decimals.
    /// 0.0 when there are no records (never NaN).
    pub attendance_rate: f64,
}

impl AttendanceStats {
    /// Computes statistics over a student's attendance records in a course.
    ///
    /// ## Example
    /// ```rust
    /// use lingua_core::attendance::AttendanceStats;
    ///
    /// let stats = AttendanceStats::from_records(&[]);
    /// assert_eq!(stats.total_days, 0);
    /// assert_eq!(stats.attendance_rate, 0.0);
    /// ```
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let total_days = records.len() as i64;
        let present_days = records.iter().filter(|r| r.present).count() as i64;
        let excused_days = records
            .iter()
            .filter(|r| !r.present && r.excused)
            .count() as i64;
        let unexcused_days = records
            .iter()
            .filter(|r| !r.present && !r.excused)
            .count() as i64;

        // Guard against division by zero: no records means 0.0, not NaN
        let attendance_rate = if total_days > 0 {
            round2(present_days as f64 / total_days as f64 * 100.0)
        } else {
            0.0
        };

        AttendanceStats {
            total_days,
            present_days,
            excused_days,
            unexcused_days,
            attendance_rate,
        }
    }
}

/// Rounds to two decimal places (half away from zero, like the reports the
/// institute prints).
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn record(day: u32, present: bool, excused: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("a-{day}"),
            student_id: "s-1".to_string(),
            course_id: "c-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            present,
            excused,
            remark: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_records_give_zero_rate() {
        let stats = AttendanceStats::from_records(&[]);
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.present_days, 0);
        assert_eq!(stats.attendance_rate, 0.0);
        assert!(!stats.attendance_rate.is_nan());
    }

    #[test]
    fn test_partition_sums_to_total() {
        let records = vec![
            record(1, true, false),
            record(2, true, false),
            record(3, false, true),
            record(4, false, false),
            record(5, true, true), // excused flag on a present day is ignored
        ];
        let stats = AttendanceStats::from_records(&records);

        assert_eq!(stats.total_days, 5);
        assert_eq!(stats.present_days, 3);
        assert_eq!(stats.excused_days, 1);
        assert_eq!(stats.unexcused_days, 1);
        assert_eq!(
            stats.present_days + stats.excused_days + stats.unexcused_days,
            stats.total_days
        );
    }

    #[test]
    fn test_rate_rounds_to_two_decimals() {
        // 2 of 3 present = 66.666...% -> 66.67
        let records = vec![
            record(1, true, false),
            record(2, true, false),
            record(3, false, false),
        ];
        let stats = AttendanceStats::from_records(&records);
        assert_eq!(stats.attendance_rate, 66.67);
    }

    #[test]
    fn test_full_attendance_is_hundred() {
        let records = vec![record(1, true, false), record(2, true, false)];
        let stats = AttendanceStats::from_records(&records);
        assert_eq!(stats.attendance_rate, 100.0);
    }
}
