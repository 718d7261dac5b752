//! Post-generation audit of a schedule against its catalog.
//!
//! Checks:
//! 1. No faculty, batch or room appears twice in one slot
//! 2. Rooms match the subject's lab/lecture requirement unless the subject has a fixed room
//! 3. Subjects with a fixed room are always placed in it
//! 4. No (batch, subject) pair exceeds its weekly hours
//! 5. Every referenced batch, subject, room and slot exists in the catalog
//!    (faculty ids are not checked, so the sentinel default passes)
//!
//! All violations are collected; the caller decides whether any of them is fatal.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::models::catalog::{BatchId, SubjectId};
use crate::models::timetable::Assignment;
use crate::timetable::catalog::Catalog;
use crate::timetable::engine::{Dimension, Schedule};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    DoubleBooked {
        slot_id: i32,
        dimension: Dimension,
        id: i32,
    },
    RoomTypeMismatch {
        subject_id: SubjectId,
        room_id: i32,
    },
    FixedRoomIgnored {
        subject_id: SubjectId,
        expected: i32,
        actual: i32,
    },
    HoursExceeded {
        batch_id: BatchId,
        subject_id: SubjectId,
        limit: i32,
        count: i32,
    },
    UnknownReference {
        dimension: &'static str,
        id: i32,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DoubleBooked { slot_id, dimension, id } => {
                write!(f, "{dimension:?} {id} booked twice in slot {slot_id}")
            }
            Violation::RoomTypeMismatch { subject_id, room_id } => {
                write!(f, "room {room_id} has the wrong type for subject {subject_id}")
            }
            Violation::FixedRoomIgnored { subject_id, expected, actual } => write!(
                f,
                "subject {subject_id} is fixed to room {expected} but was placed in room {actual}"
            ),
            Violation::HoursExceeded { batch_id, subject_id, limit, count } => write!(
                f,
                "batch {batch_id} has {count} hours of subject {subject_id} (limit {limit})"
            ),
            Violation::UnknownReference { dimension, id } => {
                write!(f, "unknown {dimension} id {id}")
            }
        }
    }
}

/// Audits `schedule` against `catalog`. Returns every violation found.
pub fn audit(catalog: &Catalog, schedule: &Schedule) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    let mut seen: HashSet<(i32, Dimension, i32)> = HashSet::new();
    let mut hours: HashMap<(BatchId, SubjectId), i32> = HashMap::new();
    let batch_ids: HashSet<_> = catalog.batches.iter().map(|b| b.id).collect();
    let slot_ids: HashSet<_> = catalog.slots.iter().map(|s| s.id).collect();

    for a in &schedule.assignments {
        for (dimension, id) in dimension_ids(a) {
            if !seen.insert((a.slot_id, dimension, id)) {
                violations.push(Violation::DoubleBooked {
                    slot_id: a.slot_id,
                    dimension,
                    id,
                });
            }
        }

        if !batch_ids.contains(&a.batch_id) {
            violations.push(Violation::UnknownReference {
                dimension: "batch",
                id: a.batch_id,
            });
        }
        if !slot_ids.contains(&a.slot_id) {
            violations.push(Violation::UnknownReference {
                dimension: "slot",
                id: a.slot_id,
            });
        }

        let room = catalog.room(a.room_id);
        if room.is_none() {
            violations.push(Violation::UnknownReference {
                dimension: "room",
                id: a.room_id,
            });
        }

        let Some(subject) = catalog.subject(a.subject_id) else {
            violations.push(Violation::UnknownReference {
                dimension: "subject",
                id: a.subject_id,
            });
            continue;
        };

        match (subject.fixed_room_id, room) {
            (Some(expected), _) if expected != a.room_id => {
                violations.push(Violation::FixedRoomIgnored {
                    subject_id: subject.id,
                    expected,
                    actual: a.room_id,
                });
            }
            (None, Some(room)) if room.room_type != subject.required_room_type() => {
                violations.push(Violation::RoomTypeMismatch {
                    subject_id: subject.id,
                    room_id: room.id,
                });
            }
            _ => {}
        }

        *hours.entry((a.batch_id, a.subject_id)).or_default() += 1;
    }

    let mut over: Vec<_> = hours.into_iter().collect();
    over.sort_unstable();
    for ((batch_id, subject_id), count) in over {
        if let Some(subject) = catalog.subject(subject_id) {
            if count > subject.hours_per_week {
                violations.push(Violation::HoursExceeded {
                    batch_id,
                    subject_id,
                    limit: subject.hours_per_week,
                    count,
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn dimension_ids(a: &Assignment) -> [(Dimension, i32); 3] {
    [
        (Dimension::Faculty, a.faculty_id),
        (Dimension::Batch, a.batch_id),
        (Dimension::Room, a.room_id),
    ]
}
