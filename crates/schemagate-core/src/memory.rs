//! In-process database double.
//!
//! [`MemoryDatabase`] implements the connection and lock contracts against a
//! mutable catalog. It records every statement, can refuse lock attempts or
//! fail statements on demand, and counts connections and probes. Statements
//! are recorded, never interpreted: tests update the catalog to model their
//! effect.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::connection::{Connection, ConnectionFactory};
use crate::error::{Error, Result};
use crate::lock::{AttainLockResult, LockFailureReason};
use crate::model::DbObjectName;
use crate::probe::{ActualObject, ProbeBatch};

#[derive(Default)]
struct MemoryState {
    catalog: Mutex<HashMap<String, ActualObject>>,
    executed: Mutex<Vec<String>>,
    lock_outcomes: Mutex<VecDeque<LockFailureReason>>,
    held_locks: Mutex<HashMap<i64, u64>>,
    failing_statements: Mutex<Vec<String>>,
    copy_rows: Mutex<VecDeque<u64>>,
    connections_opened: AtomicU32,
    probes: AtomicU32,
    next_connection: AtomicU64,
}

/// A shared in-memory database; clones see the same state.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<MemoryState>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a live object.
    pub fn install(&self, object: ActualObject) {
        self.state
            .catalog
            .lock()
            .insert(object.identifier().key(), object);
    }

    /// Remove a live object.
    pub fn remove(&self, name: &DbObjectName) -> Option<ActualObject> {
        self.state.catalog.lock().remove(&name.key())
    }

    /// The live object with this name.
    pub fn object(&self, name: &DbObjectName) -> Option<ActualObject> {
        self.state.catalog.lock().get(&name.key()).cloned()
    }

    /// Queue outcomes for the next lock attempts, in order. Once the queue
    /// is empty attempts succeed unless another connection holds the lock.
    pub fn script_lock_outcomes(&self, outcomes: impl IntoIterator<Item = LockFailureReason>) {
        self.state.lock_outcomes.lock().extend(outcomes);
    }

    /// Fail every statement containing `pattern`.
    pub fn fail_statements_containing(&self, pattern: impl Into<String>) {
        self.state.failing_statements.lock().push(pattern.into());
    }

    /// Queue row counts reported by the next `INSERT INTO` statements.
    pub fn script_copy_rows(&self, rows: impl IntoIterator<Item = u64>) {
        self.state.copy_rows.lock().extend(rows);
    }

    /// Every statement executed so far.
    pub fn executed(&self) -> Vec<String> {
        self.state.executed.lock().clone()
    }

    /// Forget the executed statements.
    pub fn clear_executed(&self) {
        self.state.executed.lock().clear();
    }

    /// Connections opened so far.
    pub fn connections_opened(&self) -> u32 {
        self.state.connections_opened.load(Ordering::SeqCst)
    }

    /// Probe batches answered so far.
    pub fn probe_count(&self) -> u32 {
        self.state.probes.load(Ordering::SeqCst)
    }

    /// Whether some connection holds the lock.
    pub fn is_locked(&self, lock_id: i64) -> bool {
        self.state.held_locks.lock().contains_key(&lock_id)
    }
}

#[async_trait]
impl ConnectionFactory for MemoryDatabase {
    async fn open(&self) -> Result<Box<dyn Connection>> {
        self.state.connections_opened.fetch_add(1, Ordering::SeqCst);
        let id = self.state.next_connection.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            id,
            state: Arc::clone(&self.state),
            closed: false,
        }))
    }
}

struct MemoryConnection {
    id: u64,
    state: Arc<MemoryState>,
    closed: bool,
}

impl MemoryConnection {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::Connection("connection is closed".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn probe(&mut self, batch: &ProbeBatch) -> Result<Vec<ActualObject>> {
        self.ensure_open()?;
        tokio::task::yield_now().await;
        self.state.probes.fetch_add(1, Ordering::SeqCst);

        let catalog = self.state.catalog.lock();
        Ok(batch
            .requests
            .iter()
            .filter_map(|r| catalog.get(&r.name.key()).cloned())
            .collect())
    }

    async fn execute(&mut self, sql: &str) -> Result<u64> {
        self.ensure_open()?;
        tokio::task::yield_now().await;

        let failing = self
            .state
            .failing_statements
            .lock()
            .iter()
            .any(|pattern| sql.contains(pattern.as_str()));
        if failing {
            return Err(Error::statement(sql, "injected statement failure"));
        }

        self.state.executed.lock().push(sql.to_string());
        if sql.starts_with("INSERT INTO") {
            Ok(self.state.copy_rows.lock().pop_front().unwrap_or(0))
        } else {
            Ok(0)
        }
    }

    async fn try_attain_lock(&mut self, lock_id: i64) -> AttainLockResult {
        if self.closed {
            return AttainLockResult::failure(LockFailureReason::DatabaseNotAvailable);
        }
        if let Some(reason) = self.state.lock_outcomes.lock().pop_front() {
            if reason != LockFailureReason::None {
                return AttainLockResult::failure(reason);
            }
        }

        let mut held = self.state.held_locks.lock();
        match held.get(&lock_id) {
            Some(owner) if *owner != self.id => AttainLockResult::failure(LockFailureReason::Failure),
            _ => {
                held.insert(lock_id, self.id);
                AttainLockResult::success()
            }
        }
    }

    async fn release_lock(&mut self, lock_id: i64) -> Result<()> {
        self.ensure_open()?;
        let mut held = self.state.held_locks.lock();
        if held.get(&lock_id) == Some(&self.id) {
            held.remove(&lock_id);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.state.held_locks.lock().retain(|_, owner| *owner != self.id);
        Ok(())
    }
}
