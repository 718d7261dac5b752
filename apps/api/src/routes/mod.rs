pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::catalog::handlers as catalog;
use crate::state::AppState;
use crate::timetable::handlers as timetable;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation
        .route(
            "/api/v1/timetable/generate",
            post(timetable::handle_generate),
        )
        .route(
            "/api/v1/timetable/:batch_id",
            get(timetable::handle_get_timetable),
        )
        // Catalog
        .route("/api/v1/meta-data", get(catalog::handle_meta_data))
        .route("/api/v1/reset", post(catalog::handle_reset))
        .route("/api/v1/batches", post(catalog::handle_create_batch))
        .route("/api/v1/batches/:id", delete(catalog::handle_delete_batch))
        .route("/api/v1/faculty", post(catalog::handle_create_faculty))
        .route("/api/v1/faculty/:id", delete(catalog::handle_delete_faculty))
        .route("/api/v1/subjects", post(catalog::handle_create_subject))
        .route("/api/v1/subjects/:id", delete(catalog::handle_delete_subject))
        .route("/api/v1/rooms", post(catalog::handle_create_room))
        .route("/api/v1/rooms/:id", delete(catalog::handle_delete_room))
        .route("/api/v1/timeslots", post(catalog::handle_create_timeslot))
        .route(
            "/api/v1/timeslots/:id",
            delete(catalog::handle_delete_timeslot),
        )
        .with_state(state)
}
