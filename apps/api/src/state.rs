use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::timetable::store::TimetableStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Catalog entry and the read-only timetable view.
    pub db: PgPool,
    /// Generation runs go through this boundary only. Default: PgTimetableStore.
    pub store: Arc<dyn TimetableStore>,
    pub config: Config,
}
