//! Catalog reader: loads the roster a generation run schedules against.
//!
//! The five sequences keep the order they were read in. That order decides every
//! tie-break in the allocation engine, so it is part of the contract:
//! batches, subjects, faculty and rooms in insertion order, slots in weekly order.

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::debug;

use crate::models::catalog::{Batch, Faculty, Room, RoomId, Subject, SubjectId, TimeSlot};

/// One consistent snapshot of the catalog for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub batches: Vec<Batch>,
    pub subjects: Vec<Subject>,
    pub faculty: Vec<Faculty>,
    pub rooms: Vec<Room>,
    pub slots: Vec<TimeSlot>,
}

impl Catalog {
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }
}

/// Reads all five catalog tables on `conn`.
///
/// Meant to run on the generation transaction so the snapshot matches the
/// rows the run writes against. Any read error is returned as-is; callers never
/// see a partial catalog.
pub async fn load_catalog(conn: &mut PgConnection) -> Result<Catalog, sqlx::Error> {
    let batches = sqlx::query_as::<_, Batch>("SELECT id, name FROM batches ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;

    let subjects = sqlx::query_as::<_, Subject>(
        "SELECT id, name, is_lab, hours_per_week, fixed_room_id FROM subjects ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await?;

    let faculty = sqlx::query_as::<_, Faculty>("SELECT id, name FROM faculty ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;

    let rooms = sqlx::query_as::<_, Room>("SELECT id, name, room_type FROM rooms ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;

    let mut slots = sqlx::query_as::<_, TimeSlot>(
        "SELECT id, day, start_time FROM timeslots ORDER BY day, start_time, id",
    )
    .fetch_all(&mut *conn)
    .await?;
    into_weekly_order(&mut slots);

    debug!(
        "Catalog loaded: {} batches, {} subjects, {} faculty, {} rooms, {} slots",
        batches.len(),
        subjects.len(),
        faculty.len(),
        rooms.len(),
        slots.len()
    );

    Ok(Catalog {
        batches,
        subjects,
        faculty,
        rooms,
        slots,
    })
}

/// Puts slots in weekly order: day, then start time, then id.
///
/// Same order as the SQL `ORDER BY`. The engine's slot tie-break depends on it.
fn into_weekly_order(slots: &mut [TimeSlot]) {
    slots.sort_by_key(TimeSlot::order_key);
}
