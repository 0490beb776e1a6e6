//! Connection contracts implemented by engine drivers.

use async_trait::async_trait;

use crate::error::Result;
use crate::lock::AttainLockResult;
use crate::probe::{ActualObject, ProbeBatch};

/// An open session with the target database.
#[async_trait]
pub trait Connection: Send {
    /// Run a probe batch and return every object that exists.
    async fn probe(&mut self, batch: &ProbeBatch) -> Result<Vec<ActualObject>>;

    /// Execute one statement and return the number of rows affected.
    async fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Try to take the database-wide advisory lock without waiting.
    async fn try_attain_lock(&mut self, lock_id: i64) -> AttainLockResult;

    /// Release the advisory lock.
    async fn release_lock(&mut self, lock_id: i64) -> Result<()>;

    /// Close the session.
    async fn close(&mut self) -> Result<()>;
}

/// Opens connections to one database.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Open a new connection.
    async fn open(&self) -> Result<Box<dyn Connection>>;
}
