//! Catalog builders shared by the timetable tests.

use chrono::NaiveTime;

use crate::models::catalog::{
    Batch, BatchId, Faculty, FacultyId, Room, RoomId, RoomType, SlotId, Subject, SubjectId,
    TimeSlot, Weekday,
};
use crate::timetable::catalog::Catalog;

pub fn batch(id: BatchId) -> Batch {
    Batch {
        id,
        name: format!("Batch {id}"),
    }
}

pub fn faculty(id: FacultyId) -> Faculty {
    Faculty {
        id,
        name: format!("Prof {id}"),
    }
}

pub fn subject(
    id: SubjectId,
    name: &str,
    hours_per_week: i32,
    is_lab: bool,
    fixed_room_id: Option<RoomId>,
) -> Subject {
    Subject {
        id,
        name: name.to_string(),
        is_lab,
        hours_per_week,
        fixed_room_id,
    }
}

pub fn lecture_room(id: RoomId) -> Room {
    Room {
        id,
        name: format!("Room {id}"),
        room_type: RoomType::Lecture,
    }
}

pub fn lab_room(id: RoomId) -> Room {
    Room {
        id,
        name: format!("Lab {id}"),
        room_type: RoomType::Lab,
    }
}

pub fn slot(id: SlotId, day: Weekday, hour: u32) -> TimeSlot {
    TimeSlot {
        id,
        day,
        start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
    }
}

/// `count` Monday slots from 09:00, ids starting at 1.
pub fn monday_slots(count: i32) -> Vec<TimeSlot> {
    (1..=count)
        .map(|id| slot(id, Weekday::Monday, 8 + id as u32))
        .collect()
}

/// A mid-sized catalog that forces contention in every dimension.
pub fn busy_catalog() -> Catalog {
    Catalog {
        batches: (1..=4).map(batch).collect(),
        subjects: vec![
            subject(1, "Mathematics", 4, false, None),
            subject(2, "Physics", 3, false, None),
            subject(3, "Physics Lab", 2, true, None),
            subject(4, "Programming", 3, false, Some(12)),
            subject(5, "Electronics Lab", 2, true, None),
        ],
        faculty: (1..=3).map(faculty).collect(),
        rooms: vec![lecture_room(10), lecture_room(11), lab_room(12)],
        slots: [Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday]
            .into_iter()
            .enumerate()
            .flat_map(|(d, day)| {
                (0..4).map(move |h| slot((d * 4 + h) as SlotId + 1, day, 9 + h as u32))
            })
            .collect(),
    }
}
