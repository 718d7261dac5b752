use chrono::NaiveTime;
use sqlx::PgPool;
use tracing::info;

use crate::models::catalog::{RoomId, RoomType, Weekday};

/// Catalog tables that accept deletes by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Batches,
    Faculty,
    Subjects,
    Rooms,
    Timeslots,
}

impl CatalogKind {
    pub fn table(self) -> &'static str {
        match self {
            CatalogKind::Batches => "batches",
            CatalogKind::Faculty => "faculty",
            CatalogKind::Subjects => "subjects",
            CatalogKind::Rooms => "rooms",
            CatalogKind::Timeslots => "timeslots",
        }
    }
}

/// Parameters for inserting a subject.
pub struct NewSubject<'a> {
    pub name: &'a str,
    pub is_lab: bool,
    pub hours_per_week: i32,
    pub fixed_room_id: Option<RoomId>,
}

pub async fn insert_batch(pool: &PgPool, name: &str) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("INSERT INTO batches (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn insert_faculty(pool: &PgPool, name: &str) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("INSERT INTO faculty (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn insert_subject(pool: &PgPool, subject: NewSubject<'_>) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO subjects (name, is_lab, hours_per_week, fixed_room_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(subject.name)
    .bind(subject.is_lab)
    .bind(subject.hours_per_week)
    .bind(subject.fixed_room_id)
    .fetch_one(pool)
    .await
}

pub async fn insert_room(pool: &PgPool, name: &str, room_type: RoomType) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("INSERT INTO rooms (name, room_type) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(room_type)
        .fetch_one(pool)
        .await
}

pub async fn insert_timeslot(
    pool: &PgPool,
    day: Weekday,
    start_time: NaiveTime,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("INSERT INTO timeslots (day, start_time) VALUES ($1, $2) RETURNING id")
        .bind(day)
        .bind(start_time)
        .fetch_one(pool)
        .await
}

/// Deletes one catalog row. Returns false if no row had that id.
pub async fn delete_by_id(pool: &PgPool, kind: CatalogKind, id: i32) -> Result<bool, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Wipes the timetable and every catalog table except time slots, atomically.
pub async fn reset_catalog(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for table in [
        "timetable_assignments",
        "subjects",
        "faculty",
        "rooms",
        "batches",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!("Catalog reset: timetable, subjects, faculty, rooms and batches cleared");
    Ok(())
}
