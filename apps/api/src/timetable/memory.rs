//! In-memory [`TimetableStore`] for tests, with fault and delay injection.
//!
//! The run holds the state lock for its whole lifetime. Writes go to a staged
//! copy that replaces the committed assignments only on `commit`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::timetable::Assignment;
use crate::timetable::catalog::Catalog;
use crate::timetable::store::{RegenerationTx, TimetableStore};

#[derive(Debug, Default)]
struct MemoryState {
    catalog: Catalog,
    assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    begin: bool,
    clear: bool,
    catalog: bool,
    persist_at: Option<usize>,
    commit: bool,
    begin_delay: Option<Duration>,
    persist_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Faults,
}

impl MemoryStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                catalog,
                assignments: Vec::new(),
            })),
            faults: Faults::default(),
        }
    }

    pub async fn seed_assignments(&self, assignments: Vec<Assignment>) {
        self.state.lock().await.assignments = assignments;
    }

    /// The committed assignments.
    pub async fn assignments(&self) -> Vec<Assignment> {
        self.state.lock().await.assignments.clone()
    }

    pub fn failing_begin(mut self) -> Self {
        self.faults.begin = true;
        self
    }

    pub fn failing_clear(mut self) -> Self {
        self.faults.clear = true;
        self
    }

    pub fn failing_catalog(mut self) -> Self {
        self.faults.catalog = true;
        self
    }

    /// Fails the `n`-th persisted assignment (0-based).
    pub fn failing_persist_at(mut self, n: usize) -> Self {
        self.faults.persist_at = Some(n);
        self
    }

    pub fn failing_commit(mut self) -> Self {
        self.faults.commit = true;
        self
    }

    /// Delays `begin`, like waiting on another run's lock.
    pub fn with_begin_delay(mut self, delay: Duration) -> Self {
        self.faults.begin_delay = Some(delay);
        self
    }

    pub fn with_persist_delay(mut self, delay: Duration) -> Self {
        self.faults.persist_delay = Some(delay);
        self
    }
}

fn connection_reset() -> sqlx::Error {
    sqlx::Error::Io(io::Error::new(
        io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    ))
}

#[async_trait]
impl TimetableStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn RegenerationTx>, sqlx::Error> {
        if let Some(delay) = self.faults.begin_delay {
            tokio::time::sleep(delay).await;
        }
        if self.faults.begin {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.assignments.clone();
        Ok(Box::new(MemoryTx {
            guard,
            staged,
            persisted: 0,
            faults: self.faults,
        }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: Vec<Assignment>,
    persisted: usize,
    faults: Faults,
}

#[async_trait]
impl RegenerationTx for MemoryTx {
    async fn clear_assignments(&mut self) -> Result<u64, sqlx::Error> {
        if self.faults.clear {
            return Err(connection_reset());
        }
        let removed = self.staged.len() as u64;
        self.staged.clear();
        Ok(removed)
    }

    async fn load_catalog(&mut self) -> Result<Catalog, sqlx::Error> {
        if self.faults.catalog {
            return Err(connection_reset());
        }
        Ok(self.guard.catalog.clone())
    }

    async fn persist_assignment(&mut self, assignment: &Assignment) -> Result<(), sqlx::Error> {
        if let Some(delay) = self.faults.persist_delay {
            tokio::time::sleep(delay).await;
        }
        if self.faults.persist_at == Some(self.persisted) {
            return Err(connection_reset());
        }
        self.staged.push(*assignment);
        self.persisted += 1;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        if self.faults.commit {
            return Err(connection_reset());
        }
        let MemoryTx {
            mut guard, staged, ..
        } = *self;
        guard.assignments = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
