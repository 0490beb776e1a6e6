//! Hooks around every executed DDL statement.

use tracing::{info, warn};

use crate::error::{Error, Result};

/// Observes statements as they are applied.
pub trait MigrationLogger: Send + Sync {
    /// Called before a statement is sent to the engine.
    fn on_schema_change(&self, sql: &str);

    /// Called when the engine rejects a statement. Returning `Ok` skips the
    /// statement and continues with the next one.
    fn on_failure(&self, sql: &str, error: Error) -> Result<()>;
}

/// Logs statements and aborts on the first failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMigrationLogger;

impl MigrationLogger for DefaultMigrationLogger {
    fn on_schema_change(&self, sql: &str) {
        info!(statement = sql, "applying schema change");
    }

    fn on_failure(&self, _sql: &str, error: Error) -> Result<()> {
        Err(error)
    }
}

/// Logs failures and keeps going.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestEffortLogger;

impl MigrationLogger for BestEffortLogger {
    fn on_schema_change(&self, sql: &str) {
        info!(statement = sql, "applying schema change");
    }

    fn on_failure(&self, sql: &str, error: Error) -> Result<()> {
        warn!(statement = sql, error = %error, "schema change failed, continuing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logger_propagates() {
        let err = DefaultMigrationLogger
            .on_failure("DROP TABLE t", Error::statement("DROP TABLE t", "locked"))
            .unwrap_err();
        assert!(matches!(err, Error::StatementFailed { .. }));
    }

    #[test]
    fn test_best_effort_logger_swallows() {
        assert!(BestEffortLogger
            .on_failure("DROP TABLE t", Error::statement("DROP TABLE t", "locked"))
            .is_ok());
    }
}
