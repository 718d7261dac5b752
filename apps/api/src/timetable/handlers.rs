//! Axum route handlers for timetable generation and the per-batch view.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::catalog::BatchId;
use crate::models::timetable::TimetableEntryRow;
use crate::state::AppState;
use crate::timetable::controller::{regenerate, GenerationSummary};

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub summary: GenerationSummary,
}

/// POST /api/v1/timetable/generate
///
/// Rebuilds the whole timetable. Responds only after the run has committed or
/// rolled back.
pub async fn handle_generate(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    let options = state.config.generation_options();
    let summary = regenerate(state.store.as_ref(), &options).await?;

    Ok(Json(GenerateResponse {
        message: "Success".to_string(),
        summary,
    }))
}

/// GET /api/v1/timetable/:batch_id
///
/// Committed assignments of one batch with display names, in weekly order.
/// An unknown batch simply has no rows.
pub async fn handle_get_timetable(
    State(state): State<AppState>,
    Path(batch_id): Path<BatchId>,
) -> Result<Json<Vec<TimetableEntryRow>>, AppError> {
    let rows = sqlx::query_as::<_, TimetableEntryRow>(
        r#"
        SELECT ts.day, ts.start_time, s.name AS subject, f.name AS faculty, r.name AS room_name
        FROM timetable_assignments t
        JOIN timeslots ts ON t.slot_id = ts.id
        JOIN subjects s ON t.subject_id = s.id
        JOIN faculty f ON t.faculty_id = f.id
        JOIN rooms r ON t.room_id = r.id
        WHERE t.batch_id = $1
        ORDER BY ts.day, ts.start_time
        "#,
    )
    .bind(batch_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}
