//! Axum route handlers for catalog entry and listing.
//!
//! Request field names follow what the timetable frontend already sends
//! (`isLab`, `hours`, `type`).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::catalog::queries::{self, CatalogKind, NewSubject};
use crate::errors::AppError;
use crate::models::catalog::{RoomId, RoomType, Weekday};
use crate::state::AppState;
use crate::timetable::catalog::{load_catalog, Catalog};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NamedRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub name: String,
    #[serde(default)]
    pub is_lab: bool,
    #[serde(deserialize_with = "number_or_string")]
    pub hours: i32,
    #[serde(default)]
    pub fixed_room_id: Option<RoomId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeslotRequest {
    pub day: Weekday,
    pub start_time: NaiveTime,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i32,
    pub msg: &'static str,
}

/// Accepts `3` as well as `"3"`; form inputs post numbers as strings.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn required_name(name: &str, what: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(format!("{what} name cannot be empty")));
    }
    Ok(name.to_string())
}

fn created(id: i32) -> (StatusCode, Json<CreatedResponse>) {
    (StatusCode::CREATED, Json(CreatedResponse { id, msg: "OK" }))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/batches
pub async fn handle_create_batch(
    State(state): State<AppState>,
    Json(req): Json<NamedRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let name = required_name(&req.name, "Batch")?;
    let id = queries::insert_batch(&state.db, &name)
        .await
        .map_err(AppError::from_write)?;
    info!("Created batch {id} ({name})");
    Ok(created(id))
}

/// POST /api/v1/faculty
pub async fn handle_create_faculty(
    State(state): State<AppState>,
    Json(req): Json<NamedRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let name = required_name(&req.name, "Faculty")?;
    let id = queries::insert_faculty(&state.db, &name)
        .await
        .map_err(AppError::from_write)?;
    info!("Created faculty {id} ({name})");
    Ok(created(id))
}

/// POST /api/v1/subjects
pub async fn handle_create_subject(
    State(state): State<AppState>,
    Json(req): Json<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let name = required_name(&req.name, "Subject")?;
    if req.hours < 1 {
        return Err(AppError::Validation(
            "hours must be at least 1 per week".to_string(),
        ));
    }

    let id = queries::insert_subject(
        &state.db,
        NewSubject {
            name: &name,
            is_lab: req.is_lab,
            hours_per_week: req.hours,
            fixed_room_id: req.fixed_room_id,
        },
    )
    .await
    .map_err(AppError::from_write)?;
    info!("Created subject {id} ({name}, {}h/week)", req.hours);
    Ok(created(id))
}

/// POST /api/v1/rooms
pub async fn handle_create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let name = required_name(&req.name, "Room")?;
    let id = queries::insert_room(&state.db, &name, req.room_type)
        .await
        .map_err(AppError::from_write)?;
    info!("Created {:?} room {id} ({name})", req.room_type);
    Ok(created(id))
}

/// POST /api/v1/timeslots
pub async fn handle_create_timeslot(
    State(state): State<AppState>,
    Json(req): Json<CreateTimeslotRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = queries::insert_timeslot(&state.db, req.day, req.start_time)
        .await
        .map_err(AppError::from_write)?;
    info!("Created time slot {id} ({:?} {})", req.day, req.start_time);
    Ok(created(id))
}

async fn delete_row(state: &AppState, kind: CatalogKind, id: i32) -> Result<StatusCode, AppError> {
    if !queries::delete_by_id(&state.db, kind, id).await? {
        return Err(AppError::NotFound(format!(
            "No row {id} in {}",
            kind.table()
        )));
    }
    info!("Deleted {} row {id}", kind.table());
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/batches/:id
pub async fn handle_delete_batch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    delete_row(&state, CatalogKind::Batches, id).await
}

/// DELETE /api/v1/faculty/:id
pub async fn handle_delete_faculty(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    delete_row(&state, CatalogKind::Faculty, id).await
}

/// DELETE /api/v1/subjects/:id
pub async fn handle_delete_subject(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    delete_row(&state, CatalogKind::Subjects, id).await
}

/// DELETE /api/v1/rooms/:id
pub async fn handle_delete_room(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    delete_row(&state, CatalogKind::Rooms, id).await
}

/// DELETE /api/v1/timeslots/:id
pub async fn handle_delete_timeslot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    delete_row(&state, CatalogKind::Timeslots, id).await
}

/// GET /api/v1/meta-data
///
/// The full catalog in the same order a generation run reads it.
pub async fn handle_meta_data(State(state): State<AppState>) -> Result<Json<Catalog>, AppError> {
    let mut conn = state.db.acquire().await?;
    let catalog = load_catalog(&mut conn).await?;
    Ok(Json(catalog))
}

/// POST /api/v1/reset
pub async fn handle_reset(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    queries::reset_catalog(&state.db).await?;
    Ok(Json(json!({ "message": "Reset Complete" })))
}
