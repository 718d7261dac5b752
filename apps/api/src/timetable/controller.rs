//! Commit controller: one generation run as one atomic rebuild.
//!
//! Flow: begin → clear → load catalog → generate → audit → persist each
//!       assignment → commit.
//!
//! Any failure (or the timeout) between begin and commit rolls the transaction
//! back, which also restores the assignments that were cleared. Callers either
//! see the complete new schedule or the untouched old one.
//!
//! The timeout starts before `begin`, so waiting for another run's lock counts
//! against it. `commit` itself is never cut short: once it is sent, the outcome
//! belongs to the database.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::catalog::FacultyId;
use crate::models::timetable::Assignment;
use crate::timetable::audit::{audit, Violation};
use crate::timetable::engine::{generate, Schedule, Shortfall};
use crate::timetable::store::{RegenerationTx, TimetableStore};

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Taught-by id used for every subject when the faculty list is empty.
    pub default_faculty_id: FacultyId,
    /// Upper bound for a run; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            default_faculty_id: 1,
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to open generation transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("failed to clear previous timetable: {0}")]
    Clear(#[source] sqlx::Error),

    #[error("failed to load catalog: {0}")]
    Catalog(#[source] sqlx::Error),

    #[error(
        "failed to persist assignment (batch {}, subject {}, slot {}): {source}",
        .assignment.batch_id, .assignment.subject_id, .assignment.slot_id
    )]
    Persist {
        assignment: Assignment,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to commit timetable: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("generated schedule failed audit: {}", join_violations(.0))]
    Invariant(Vec<Violation>),

    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),
}

impl GenerationError {
    pub fn stage(&self) -> &'static str {
        match self {
            GenerationError::Begin(_) => "begin",
            GenerationError::Clear(_) => "clear",
            GenerationError::Catalog(_) => "catalog",
            GenerationError::Persist { .. } => "persist",
            GenerationError::Commit(_) => "commit",
            GenerationError::Invariant(_) => "audit",
            GenerationError::TimedOut(_) => "timeout",
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// What a committed run did.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub run_id: Uuid,
    /// Assignment rows of the previous schedule that were replaced.
    pub cleared: u64,
    pub assignments_created: usize,
    pub batches: usize,
    pub subjects: usize,
    pub slots: usize,
    pub shortfalls: Vec<Shortfall>,
    pub elapsed_ms: u64,
}

struct Rebuilt {
    cleared: u64,
    batches: usize,
    subjects: usize,
    slots: usize,
    schedule: Schedule,
}

/// Regenerates the full timetable for all batches.
pub async fn regenerate(
    store: &dyn TimetableStore,
    options: &GenerationOptions,
) -> Result<GenerationSummary, GenerationError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("generation", %run_id);
    run(store, options, run_id).instrument(span).await
}

async fn run(
    store: &dyn TimetableStore,
    options: &GenerationOptions,
    run_id: Uuid,
) -> Result<GenerationSummary, GenerationError> {
    let started = Instant::now();
    let deadline = options.timeout.map(|limit| (started + limit, limit));
    info!("Starting timetable generation run {run_id}");

    let mut tx = within(deadline, async {
        store.begin().await.map_err(GenerationError::Begin)
    })
    .await
    .map_err(|e| {
        warn!("Generation run {run_id} could not start: {e}");
        e
    })?;

    let outcome = within(deadline, rebuild(&mut *tx, options)).await;

    let rebuilt = match outcome {
        Ok(rebuilt) => rebuilt,
        Err(e) => {
            warn!(
                "Generation run {run_id} failed at {}: {e}; rolling back",
                e.stage()
            );
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback of generation run {run_id} failed: {rollback_err}");
            }
            return Err(e);
        }
    };

    tx.commit().await.map_err(|e| {
        warn!("Commit of generation run {run_id} failed: {e}");
        GenerationError::Commit(e)
    })?;

    for shortfall in &rebuilt.schedule.shortfalls {
        warn!(
            "Batch {} subject {} scheduled {}/{} weekly hours",
            shortfall.batch_id, shortfall.subject_id, shortfall.scheduled, shortfall.required
        );
    }

    let summary = GenerationSummary {
        run_id,
        cleared: rebuilt.cleared,
        assignments_created: rebuilt.schedule.assignments.len(),
        batches: rebuilt.batches,
        subjects: rebuilt.subjects,
        slots: rebuilt.slots,
        shortfalls: rebuilt.schedule.shortfalls,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    info!(
        "Committed generation run {run_id}: {} assignments, {} shortfalls, {}ms",
        summary.assignments_created,
        summary.shortfalls.len(),
        summary.elapsed_ms
    );

    Ok(summary)
}

/// Awaits `fut`, giving up at the run's deadline if it has one.
async fn within<T>(
    deadline: Option<(Instant, Duration)>,
    fut: impl Future<Output = Result<T, GenerationError>>,
) -> Result<T, GenerationError> {
    match deadline {
        Some((at, limit)) => tokio::time::timeout_at(at, fut)
            .await
            .unwrap_or(Err(GenerationError::TimedOut(limit))),
        None => fut.await,
    }
}

/// Everything between `begin` and `commit`, on the run's transaction.
async fn rebuild(
    tx: &mut dyn RegenerationTx,
    options: &GenerationOptions,
) -> Result<Rebuilt, GenerationError> {
    let cleared = tx
        .clear_assignments()
        .await
        .map_err(GenerationError::Clear)?;
    info!("Cleared {cleared} previous assignments");

    let catalog = tx.load_catalog().await.map_err(GenerationError::Catalog)?;

    let schedule = generate(&catalog, options.default_faculty_id);
    audit(&catalog, &schedule).map_err(GenerationError::Invariant)?;

    for assignment in &schedule.assignments {
        tx.persist_assignment(assignment)
            .await
            .map_err(|source| GenerationError::Persist {
                assignment: *assignment,
                source,
            })?;
    }

    Ok(Rebuilt {
        cleared,
        batches: catalog.batches.len(),
        subjects: catalog.subjects.len(),
        slots: catalog.slots.len(),
        schedule,
    })
}
