//! Migration configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::feature::CycleBehavior;
use crate::lock::{lock_id_for, ReconnectionOptions};
use crate::migration::AutoCreate;

/// Default wait for the in-process schema lock, in milliseconds.
pub const DEFAULT_LOCAL_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Default number of rows copied per page during a table rebuild.
pub const DEFAULT_COPY_BATCH_SIZE: u64 = 10_000;

/// How a [`Database`](crate::Database) applies schema changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Policy used when an apply call does not name one.
    pub auto_create: AutoCreate,

    /// Reconnection budget for the global lock.
    pub reconnection: ReconnectionOptions,

    /// Global lock id. None derives one from the database identifier.
    pub lock_id: Option<i64>,

    /// Wait for the in-process schema lock.
    pub local_lock_timeout_ms: u64,

    /// Rows copied per page during a table rebuild.
    pub copy_batch_size: u64,

    /// Handling of cyclic feature dependencies.
    pub cycle_behavior: CycleBehavior,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            auto_create: AutoCreate::default(),
            reconnection: ReconnectionOptions::default(),
            lock_id: None,
            local_lock_timeout_ms: DEFAULT_LOCAL_LOCK_TIMEOUT_MS,
            copy_batch_size: DEFAULT_COPY_BATCH_SIZE,
            cycle_behavior: CycleBehavior::default(),
        }
    }
}

impl MigrationConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the default policy.
    pub fn with_auto_create(mut self, policy: AutoCreate) -> Self {
        self.auto_create = policy;
        self
    }

    /// Set the reconnection budget.
    pub fn with_reconnection(mut self, options: ReconnectionOptions) -> Self {
        self.reconnection = options;
        self
    }

    /// Use a fixed global lock id.
    pub fn with_lock_id(mut self, lock_id: i64) -> Self {
        self.lock_id = Some(lock_id);
        self
    }

    /// Set the in-process lock timeout.
    pub fn with_local_lock_timeout(mut self, timeout: Duration) -> Self {
        self.local_lock_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the rebuild copy page size. Zero is treated as one.
    pub fn with_copy_batch_size(mut self, rows: u64) -> Self {
        self.copy_batch_size = rows.max(1);
        self
    }

    /// Set the dependency cycle handling.
    pub fn with_cycle_behavior(mut self, behavior: CycleBehavior) -> Self {
        self.cycle_behavior = behavior;
        self
    }

    /// The in-process lock timeout.
    pub fn local_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.local_lock_timeout_ms)
    }

    /// The global lock id for a database.
    pub fn lock_id_for(&self, database: &str) -> i64 {
        self.lock_id.unwrap_or_else(|| lock_id_for(database))
    }
}
