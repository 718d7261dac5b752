//! Allocation engine: the greedy timetable pass.
//!
//! Algorithm:
//! 1. Fix the faculty rotation once: subject k is taught by `faculty[k mod len]`
//!    (or the sentinel default id when there is no faculty), for every batch.
//! 2. For each batch → subject → slot, in catalog order:
//!    - stop once the subject has its weekly hours
//!    - skip the slot if the faculty or the batch is already busy in it
//!    - pick the fixed room if it is free, otherwise the first free room of the right type
//!    - emit an assignment when a room was found; otherwise move on silently
//!
//! No backtracking. A subject that runs out of slots ends short and is reported
//! as a [`Shortfall`], never as an error.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::catalog::{
    BatchId, FacultyId, Room, RoomId, SlotId, Subject, SubjectId, TimeSlot,
};
use crate::models::timetable::Assignment;
use crate::timetable::catalog::Catalog;

// ────────────────────────────────────────────────────────────────────────────
// Conflict index
// ────────────────────────────────────────────────────────────────────────────

/// The three exclusivity dimensions checked per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Faculty,
    Batch,
    Room,
}

/// Who is busy in which slot during the current run.
///
/// Updated immediately after each emitted assignment, so every later check
/// observes all earlier decisions of the same run.
#[derive(Debug, Default)]
pub struct ConflictIndex {
    faculty: HashMap<SlotId, HashSet<FacultyId>>,
    batches: HashMap<SlotId, HashSet<BatchId>>,
    rooms: HashMap<SlotId, HashSet<RoomId>>,
}

impl ConflictIndex {
    pub fn is_occupied(&self, slot_id: SlotId, dimension: Dimension, id: i32) -> bool {
        self.dimension(dimension)
            .get(&slot_id)
            .is_some_and(|ids| ids.contains(&id))
    }

    pub fn record(&mut self, assignment: &Assignment) {
        let slot = assignment.slot_id;
        self.faculty
            .entry(slot)
            .or_default()
            .insert(assignment.faculty_id);
        self.batches
            .entry(slot)
            .or_default()
            .insert(assignment.batch_id);
        self.rooms.entry(slot).or_default().insert(assignment.room_id);
    }

    fn dimension(&self, dimension: Dimension) -> &HashMap<SlotId, HashSet<i32>> {
        match dimension {
            Dimension::Faculty => &self.faculty,
            Dimension::Batch => &self.batches,
            Dimension::Room => &self.rooms,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// A (batch, subject) pair that did not reach its weekly hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub batch_id: BatchId,
    pub subject_id: SubjectId,
    pub required: i32,
    pub scheduled: i32,
}

/// Result of one engine pass. `assignments` is in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub assignments: Vec<Assignment>,
    pub shortfalls: Vec<Shortfall>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Faculty for each subject, index-aligned with `catalog.subjects`.
///
/// The rotation is global: the same subject gets the same faculty member in
/// every batch.
pub fn faculty_rotation(catalog: &Catalog, default_faculty_id: FacultyId) -> Vec<FacultyId> {
    (0..catalog.subjects.len())
        .map(|k| {
            if catalog.faculty.is_empty() {
                default_faculty_id
            } else {
                catalog.faculty[k % catalog.faculty.len()].id
            }
        })
        .collect()
}

/// Runs the greedy pass over `catalog`. Deterministic for identical input order.
pub fn generate(catalog: &Catalog, default_faculty_id: FacultyId) -> Schedule {
    let rotation = faculty_rotation(catalog, default_faculty_id);
    let mut index = ConflictIndex::default();
    let mut schedule = Schedule::default();

    for batch in &catalog.batches {
        for (subject, &faculty_id) in catalog.subjects.iter().zip(&rotation) {
            let mut hours_scheduled = 0;

            for slot in &catalog.slots {
                if hours_scheduled >= subject.hours_per_week {
                    break;
                }
                if index.is_occupied(slot.id, Dimension::Faculty, faculty_id)
                    || index.is_occupied(slot.id, Dimension::Batch, batch.id)
                {
                    continue;
                }
                let Some(room_id) = select_room(&index, subject, &catalog.rooms, slot) else {
                    continue;
                };

                let assignment = Assignment {
                    batch_id: batch.id,
                    subject_id: subject.id,
                    faculty_id,
                    room_id,
                    slot_id: slot.id,
                };
                debug!(
                    "Assigned batch {} subject {} to slot {} (faculty {}, room {})",
                    batch.id, subject.id, slot.id, faculty_id, room_id
                );
                index.record(&assignment);
                schedule.assignments.push(assignment);
                hours_scheduled += 1;
            }

            if hours_scheduled < subject.hours_per_week {
                schedule.shortfalls.push(Shortfall {
                    batch_id: batch.id,
                    subject_id: subject.id,
                    required: subject.hours_per_week,
                    scheduled: hours_scheduled,
                });
            }
        }
    }

    schedule
}

/// Picks a free room for `subject` in `slot`, or `None` if every candidate is taken.
///
/// A fixed room is used verbatim with no type check.
fn select_room(
    index: &ConflictIndex,
    subject: &Subject,
    rooms: &[Room],
    slot: &TimeSlot,
) -> Option<RoomId> {
    if let Some(fixed) = subject.fixed_room_id {
        return (!index.is_occupied(slot.id, Dimension::Room, fixed)).then_some(fixed);
    }

    let wanted = subject.required_room_type();
    rooms
        .iter()
        .filter(|r| r.room_type == wanted)
        .find(|r| !index.is_occupied(slot.id, Dimension::Room, r.id))
        .map(|r| r.id)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::Weekday;
    use crate::timetable::audit::audit;
    use crate::timetable::fixtures::*;

    fn assignment(batch_id: i32, slot_id: i32, room_id: i32) -> Assignment {
        Assignment {
            batch_id,
            subject_id: 1,
            faculty_id: 1,
            room_id,
            slot_id,
        }
    }

    #[test]
    fn test_conflict_index_tracks_each_dimension_per_slot() {
        let mut index = ConflictIndex::default();
        index.record(&assignment(3, 5, 9));

        assert!(index.is_occupied(5, Dimension::Faculty, 1));
        assert!(index.is_occupied(5, Dimension::Batch, 3));
        assert!(index.is_occupied(5, Dimension::Room, 9));
        assert!(!index.is_occupied(6, Dimension::Room, 9));
        assert!(!index.is_occupied(5, Dimension::Batch, 9));
    }

    #[test]
    fn test_faculty_rotation_wraps_around() {
        let catalog = Catalog {
            subjects: (1..=5).map(|id| subject(id, "S", 1, false, None)).collect(),
            faculty: vec![faculty(20), faculty(30)],
            ..Default::default()
        };
        assert_eq!(faculty_rotation(&catalog, 1), vec![20, 30, 20, 30, 20]);
    }

    #[test]
    fn test_faculty_rotation_uses_sentinel_without_faculty() {
        let catalog = Catalog {
            subjects: vec![
                subject(1, "S", 1, false, None),
                subject(2, "T", 1, false, None),
            ],
            ..Default::default()
        };
        assert_eq!(faculty_rotation(&catalog, 99), vec![99, 99]);
    }

    #[test]
    fn test_single_subject_fills_earliest_slots_in_first_room() {
        let catalog = Catalog {
            batches: vec![batch(1)],
            subjects: vec![subject(1, "Algebra", 2, false, None)],
            faculty: vec![faculty(7)],
            rooms: vec![lecture_room(10), lecture_room(11)],
            slots: monday_slots(5),
        };

        let schedule = generate(&catalog, 1);

        assert_eq!(
            schedule.assignments,
            vec![
                Assignment { batch_id: 1, subject_id: 1, faculty_id: 7, room_id: 10, slot_id: 1 },
                Assignment { batch_id: 1, subject_id: 1, faculty_id: 7, room_id: 10, slot_id: 2 },
            ]
        );
        assert!(schedule.shortfalls.is_empty());
    }

    #[test]
    fn test_second_batch_starves_when_faculty_and_room_are_consumed() {
        let catalog = Catalog {
            batches: vec![batch(1), batch(2)],
            subjects: vec![subject(1, "Algebra", 1, false, None)],
            faculty: vec![faculty(7)],
            rooms: vec![lecture_room(10)],
            slots: monday_slots(1),
        };

        let schedule = generate(&catalog, 1);

        assert_eq!(schedule.assignments.len(), 1);
        assert_eq!(schedule.assignments[0].batch_id, 1);
        assert_eq!(
            schedule.shortfalls,
            vec![Shortfall { batch_id: 2, subject_id: 1, required: 1, scheduled: 0 }]
        );
    }

    #[test]
    fn test_fixed_room_bypasses_type_match() {
        let catalog = Catalog {
            batches: vec![batch(1)],
            subjects: vec![subject(1, "Seminar", 2, false, Some(12))],
            faculty: vec![faculty(7)],
            rooms: vec![lecture_room(10), lab_room(12)],
            slots: monday_slots(3),
        };

        let schedule = generate(&catalog, 1);

        assert_eq!(schedule.assignments.len(), 2);
        assert!(schedule.assignments.iter().all(|a| a.room_id == 12));
    }

    #[test]
    fn test_busy_fixed_room_skips_slot_instead_of_falling_back() {
        let catalog = Catalog {
            batches: vec![batch(1), batch(2)],
            subjects: vec![
                subject(1, "Studio", 1, false, Some(12)),
                subject(2, "Workshop", 1, false, Some(12)),
            ],
            faculty: vec![faculty(7), faculty(8)],
            rooms: vec![lecture_room(10), lab_room(12)],
            slots: monday_slots(2),
        };

        let schedule = generate(&catalog, 1);

        // Batch 1 holds room 12 in both slots; the free lecture room is never a fallback.
        let got: Vec<_> = schedule
            .assignments
            .iter()
            .map(|a| (a.batch_id, a.subject_id, a.slot_id, a.room_id))
            .collect();
        assert_eq!(got, vec![(1, 1, 1, 12), (1, 2, 2, 12)]);
        let starved: Vec<_> = schedule
            .shortfalls
            .iter()
            .map(|s| (s.batch_id, s.subject_id))
            .collect();
        assert_eq!(starved, vec![(2, 1), (2, 2)]);
    }

    #[test]
    fn test_lab_subject_without_lab_room_is_never_scheduled() {
        let catalog = Catalog {
            batches: vec![batch(1)],
            subjects: vec![subject(1, "Circuits Lab", 2, true, None)],
            faculty: vec![faculty(7)],
            rooms: vec![lecture_room(10)],
            slots: monday_slots(4),
        };

        let schedule = generate(&catalog, 1);

        assert!(schedule.assignments.is_empty());
        assert_eq!(schedule.shortfalls[0].scheduled, 0);
        assert_eq!(schedule.shortfalls[0].required, 2);
    }

    #[test]
    fn test_second_room_used_when_first_is_taken() {
        let catalog = Catalog {
            batches: vec![batch(1), batch(2)],
            subjects: vec![
                subject(1, "Algebra", 1, false, None),
                subject(2, "History", 1, false, None),
            ],
            faculty: vec![faculty(7), faculty(8)],
            rooms: vec![lecture_room(10), lecture_room(11)],
            slots: monday_slots(2),
        };

        let schedule = generate(&catalog, 1);

        // b1: Algebra@s1/r10 (f7), History@s2/r10 (f8)
        // b2: Algebra@s2/r11 (f7 free in s2), History@s1/r11 (f8 free in s1)
        let got: Vec<_> = schedule
            .assignments
            .iter()
            .map(|a| (a.batch_id, a.subject_id, a.slot_id, a.room_id))
            .collect();
        assert_eq!(got, vec![(1, 1, 1, 10), (1, 2, 2, 10), (2, 1, 2, 11), (2, 2, 1, 11)]);
    }

    #[test]
    fn test_slots_follow_catalog_order() {
        let catalog = Catalog {
            batches: vec![batch(1)],
            subjects: vec![subject(1, "Algebra", 1, false, None)],
            faculty: vec![faculty(7)],
            rooms: vec![lecture_room(10)],
            slots: vec![slot(5, Weekday::Monday, 9), slot(2, Weekday::Tuesday, 9)],
        };

        let schedule = generate(&catalog, 1);

        assert_eq!(schedule.assignments[0].slot_id, 5);
    }

    #[test]
    fn test_hour_cap_and_no_double_booking_under_contention() {
        let catalog = busy_catalog();
        let schedule = generate(&catalog, 1);

        assert!(!schedule.assignments.is_empty());
        assert_eq!(audit(&catalog, &schedule), Ok(()));
    }

    #[test]
    fn test_shortfalls_account_for_every_missing_hour() {
        let catalog = busy_catalog();
        let schedule = generate(&catalog, 1);

        let required: i32 = catalog.subjects.iter().map(|s| s.hours_per_week).sum::<i32>()
            * catalog.batches.len() as i32;
        let missing: i32 = schedule
            .shortfalls
            .iter()
            .map(|s| s.required - s.scheduled)
            .sum();
        assert_eq!(schedule.assignments.len() as i32 + missing, required);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let catalog = busy_catalog();
        assert_eq!(generate(&catalog, 1), generate(&catalog, 1));
    }

    #[test]
    fn test_empty_catalog_produces_empty_schedule() {
        assert_eq!(generate(&Catalog::default(), 1), Schedule::default());
    }
}
