use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::catalog::{BatchId, FacultyId, RoomId, SlotId, SubjectId, Weekday};

/// One scheduled class period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub batch_id: BatchId,
    pub subject_id: SubjectId,
    pub faculty_id: FacultyId,
    pub room_id: RoomId,
    pub slot_id: SlotId,
}

/// A committed assignment joined with display names, as viewers read it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimetableEntryRow {
    pub day: Weekday,
    pub start_time: NaiveTime,
    pub subject: String,
    pub faculty: String,
    pub room_name: String,
}
