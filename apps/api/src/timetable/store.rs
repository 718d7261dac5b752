//! Store boundary for generation runs.
//!
//! A run talks to the backing store only through a [`RegenerationTx`]: every
//! mutation goes through the handle, and the handle ends in exactly one of
//! `commit` or `rollback`. Dropping it without either rolls back.
//!
//! `AppState` holds an `Arc<dyn TimetableStore>`; production uses [`PgTimetableStore`].

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::timetable::Assignment;
use crate::timetable::catalog::{load_catalog, Catalog};

#[async_trait]
pub trait TimetableStore: Send + Sync {
    /// Opens the transaction a single generation run owns exclusively.
    async fn begin(&self) -> Result<Box<dyn RegenerationTx>, sqlx::Error>;
}

#[async_trait]
pub trait RegenerationTx: Send {
    /// Deletes every assignment row, returning how many were removed.
    async fn clear_assignments(&mut self) -> Result<u64, sqlx::Error>;

    async fn load_catalog(&mut self) -> Result<Catalog, sqlx::Error>;

    async fn persist_assignment(&mut self, assignment: &Assignment) -> Result<(), sqlx::Error>;

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error>;

    async fn rollback(self: Box<Self>) -> Result<(), sqlx::Error>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

/// Statements every generation transaction starts with, in this order.
///
/// REPEATABLE READ gives the five catalog reads one shared snapshot, so a catalog
/// write committing mid-load cannot leave a subject pinned to a room the run never
/// sees. The level must be set before any other statement. The snapshot is taken
/// at the first query after the lock, so a queued run sees the previous run's commit.
///
/// EXCLUSIVE blocks other writers (and so other runs, and cascading catalog deletes)
/// but not plain SELECTs; viewers keep reading the previous schedule until commit.
const RUN_SETUP: [&str; 2] = [
    "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
    "LOCK TABLE timetable_assignments IN EXCLUSIVE MODE",
];

#[derive(Clone)]
pub struct PgTimetableStore {
    pool: PgPool,
}

impl PgTimetableStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimetableStore for PgTimetableStore {
    async fn begin(&self) -> Result<Box<dyn RegenerationTx>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for statement in RUN_SETUP {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        Ok(Box::new(PgRegenerationTx { tx }))
    }
}

struct PgRegenerationTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RegenerationTx for PgRegenerationTx {
    async fn clear_assignments(&mut self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timetable_assignments")
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn load_catalog(&mut self) -> Result<Catalog, sqlx::Error> {
        load_catalog(&mut self.tx).await
    }

    async fn persist_assignment(&mut self, assignment: &Assignment) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO timetable_assignments (batch_id, subject_id, faculty_id, room_id, slot_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(assignment.batch_id)
        .bind(assignment.subject_id)
        .bind(assignment.faculty_id)
        .bind(assignment.room_id)
        .bind(assignment.slot_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}
