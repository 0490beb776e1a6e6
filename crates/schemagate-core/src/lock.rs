//! Cross-process advisory locking with bounded reconnection.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::connection::{Connection, ConnectionFactory};
use crate::error::{Error, Result};

/// Why a lock attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LockFailureReason {
    /// The attempt succeeded.
    #[default]
    None,
    /// The lock is held elsewhere or the engine refused it.
    Failure,
    /// The connection dropped; a new one may succeed.
    DatabaseNotAvailable,
}

impl fmt::Display for LockFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockFailureReason::None => write!(f, "none"),
            LockFailureReason::Failure => write!(f, "lock refused"),
            LockFailureReason::DatabaseNotAvailable => write!(f, "database not available"),
        }
    }
}

/// Outcome of one lock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttainLockResult {
    /// Whether the lock is now held.
    pub succeeded: bool,
    /// Failure reason when it is not.
    pub reason: LockFailureReason,
}

impl AttainLockResult {
    /// The lock was taken.
    pub fn success() -> Self {
        Self {
            succeeded: true,
            reason: LockFailureReason::None,
        }
    }

    /// The lock was not taken.
    pub fn failure(reason: LockFailureReason) -> Self {
        Self {
            succeeded: false,
            reason,
        }
    }

    /// Whether a fresh connection might succeed.
    pub fn should_reconnect(&self) -> bool {
        self.reason == LockFailureReason::DatabaseNotAvailable
    }
}

/// Reconnection budget for lock attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectionOptions {
    /// Reconnections allowed after the first attempt.
    pub max_reconnection_count: u32,
    /// Base delay; attempt `n` waits `n * delay_in_ms`.
    pub delay_in_ms: u64,
}

impl Default for ReconnectionOptions {
    fn default() -> Self {
        Self {
            max_reconnection_count: 3,
            delay_in_ms: 50,
        }
    }
}

impl ReconnectionOptions {
    /// Delay before reconnection `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.delay_in_ms.saturating_mul(u64::from(attempt)))
    }
}

/// A connection holding the global lock.
pub struct GlobalLock {
    connection: Box<dyn Connection>,
    lock_id: i64,
    reconnections: u32,
}

impl GlobalLock {
    /// Take the lock, reconnecting while the database reports itself
    /// unavailable and the budget allows. Any other failure is terminal.
    pub async fn attain(
        factory: &dyn ConnectionFactory,
        database: &str,
        lock_id: i64,
        options: &ReconnectionOptions,
    ) -> Result<Self> {
        let mut connection = factory.open().await?;
        let mut reconnections = 0u32;

        loop {
            let result = connection.try_attain_lock(lock_id).await;
            if result.succeeded {
                debug!(database, lock_id, reconnections, "attained global lock");
                return Ok(Self {
                    connection,
                    lock_id,
                    reconnections,
                });
            }

            if result.should_reconnect() && reconnections < options.max_reconnection_count {
                reconnections += 1;
                let delay = options.delay_for(reconnections);
                warn!(
                    database,
                    lock_id,
                    attempt = reconnections,
                    delay_ms = delay.as_millis() as u64,
                    "database not available while locking, reconnecting"
                );
                close_quietly(connection.as_mut(), database).await;
                connection = factory.open().await?;
                tokio::time::sleep(delay).await;
                continue;
            }

            close_quietly(connection.as_mut(), database).await;
            return Err(Error::LockUnavailable {
                database: database.to_string(),
                lock_id,
                attempts: reconnections + 1,
                reason: result.reason,
            });
        }
    }

    /// The locked connection.
    pub fn connection(&mut self) -> &mut dyn Connection {
        self.connection.as_mut()
    }

    /// Reconnections needed to take the lock.
    pub fn reconnections(&self) -> u32 {
        self.reconnections
    }

    /// Release the lock, then close the connection. The connection is
    /// closed even when the release fails.
    pub async fn release(mut self) -> Result<()> {
        let released = self.connection.release_lock(self.lock_id).await;
        let closed = self.connection.close().await;
        released?;
        closed
    }
}

async fn close_quietly(connection: &mut dyn Connection, database: &str) {
    if let Err(e) = connection.close().await {
        warn!(database, error = %e, "failed to close connection");
    }
}

/// Derive a stable lock id from a database identifier.
pub fn lock_id_for(database: &str) -> i64 {
    let hash = blake3::hash(database.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    i64::from_le_bytes(bytes)
}
