use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type BatchId = i32;
pub type SubjectId = i32;
pub type FacultyId = i32;
pub type RoomId = i32;
pub type SlotId = i32;

/// Teaching days. Declaration order is the weekly order, mirrored by the
/// `weekday` Postgres enum so `ORDER BY day` agrees with `Ord`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "weekday", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "room_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Lecture,
    Lab,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Batch {
    pub id: BatchId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub is_lab: bool,
    pub hours_per_week: i32,
    /// Pins every occurrence to this room, bypassing the room-type match.
    pub fixed_room_id: Option<RoomId>,
}

impl Subject {
    pub fn required_room_type(&self) -> RoomType {
        if self.is_lab {
            RoomType::Lab
        } else {
            RoomType::Lecture
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TimeSlot {
    pub id: SlotId,
    pub day: Weekday,
    pub start_time: NaiveTime,
}

impl TimeSlot {
    /// Weekly position of the slot; `id` only breaks ties between identical times.
    pub fn order_key(&self) -> (Weekday, NaiveTime, SlotId) {
        (self.day, self.start_time, self.id)
    }
}
