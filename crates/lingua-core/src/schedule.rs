//! # Schedule Overlap Math
//!
//! Pure overlap detection for weekly schedule slots.
//!
//! ## The Overlap Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            Boundary-INCLUSIVE interval overlap                          │
//! │                                                                         │
//! │   existing:        09:00 ─────────── 11:00                             │
//! │                                                                         │
//! │   08:00─09:30   overlaps  (ends inside)                                │
//! │   10:00─12:00   overlaps  (starts inside)                              │
//! │   11:00─12:00   OVERLAPS  (back-to-back: new.start == existing.end)    │
//! │   08:00─09:00   OVERLAPS  (back-to-back: new.end == existing.start)    │
//! │   11:01─12:00   free                                                    │
//! │                                                                         │
//! │   overlap ⟺ NOT (new.end < existing.start OR new.start > existing.end) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The comparisons are deliberately non-strict: two slots sharing an exact
//! boundary instant conflict. Back-to-back blocks need a gap (the institute
//! plans breaks between lessons). Callers must preserve this exact semantic.

use chrono::NaiveTime;

use crate::types::ScheduleSlot;

// =============================================================================
// Overlap Detection
// =============================================================================

/// Whether two time intervals overlap under the boundary-inclusive rule.
///
/// ## Example
/// ```rust
/// use chrono::NaiveTime;
/// use lingua_core::schedule::overlaps;
///
/// let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
///
/// assert!(overlaps(t(9), t(11), t(10), t(12)));
/// // Sharing a boundary instant still conflicts
/// assert!(overlaps(t(11), t(12), t(9), t(11)));
/// assert!(!overlaps(t(12), t(13), t(9), t(11)));
/// ```
pub fn overlaps(
    new_start: NaiveTime,
    new_end: NaiveTime,
    existing_start: NaiveTime,
    existing_end: NaiveTime,
) -> bool {
    !(new_end < existing_start || new_start > existing_end)
}

/// Finds the first active slot a candidate interval collides with.
///
/// The caller supplies the sibling slots of the same course and weekday;
/// inactive (soft-deleted) slots never conflict and are skipped here even if
/// the caller forgets to filter them out.
pub fn find_conflict<'a>(
    new_start: NaiveTime,
    new_end: NaiveTime,
    siblings: &'a [ScheduleSlot],
) -> Option<&'a ScheduleSlot> {
    siblings
        .iter()
        .filter(|slot| slot.is_active)
        .find(|slot| overlaps(new_start, new_end, slot.start_time, slot.end_time))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Weekday;
    use chrono::Utc;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(start: NaiveTime, end: NaiveTime, is_active: bool) -> ScheduleSlot {
        ScheduleSlot {
            id: "sl-1".to_string(),
            course_id: "c-1".to_string(),
            weekday: Weekday::Monday,
            start_time: start,
            end_time: end,
            remarks: None,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_contained_interval_overlaps() {
        assert!(overlaps(t(9, 30), t(10, 30), t(9, 0), t(11, 0)));
    }

    #[test]
    fn test_partial_overlap() {
        assert!(overlaps(t(8, 0), t(9, 30), t(9, 0), t(11, 0)));
        assert!(overlaps(t(10, 0), t(12, 0), t(9, 0), t(11, 0)));
    }

    #[test]
    fn test_boundary_instant_conflicts() {
        // new.start == existing.end
        assert!(overlaps(t(11, 0), t(12, 0), t(9, 0), t(11, 0)));
        // new.end == existing.start
        assert!(overlaps(t(8, 0), t(9, 0), t(9, 0), t(11, 0)));
    }

    #[test]
    fn test_disjoint_intervals_are_free() {
        assert!(!overlaps(t(11, 1), t(12, 0), t(9, 0), t(11, 0)));
        assert!(!overlaps(t(7, 0), t(8, 59), t(9, 0), t(11, 0)));
    }

    #[test]
    fn test_find_conflict_skips_inactive_slots() {
        let siblings = vec![
            slot(t(9, 0), t(11, 0), false),
            slot(t(14, 0), t(16, 0), true),
        ];

        // Collides only with the inactive morning slot -> no conflict
        assert!(find_conflict(t(9, 30), t(10, 30), &siblings).is_none());
        // Collides with the active afternoon slot
        let hit = find_conflict(t(15, 0), t(17, 0), &siblings).unwrap();
        assert_eq!(hit.start_time, t(14, 0));
    }
}
