//! Core error types.

use std::time::Duration;

use thiserror::Error;

use crate::delta::Difference;
use crate::lock::LockFailureReason;
use crate::migration::AutoCreate;

/// A delta rejected by the policy gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDelta {
    /// Fully qualified name of the object.
    pub object: String,
    /// The difference that the policy does not allow.
    pub difference: Difference,
}

impl std::fmt::Display for RejectedDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.object, self.difference)
    }
}

fn join_rejected(deltas: &[RejectedDelta]) -> String {
    deltas
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while computing, validating or applying schema changes.
#[derive(Debug, Error)]
pub enum Error {
    /// The computed migration is not allowed under the requested policy.
    #[error("migration rejected under auto-create policy {policy}: {}", join_rejected(.deltas))]
    ValidationFailed {
        /// The policy the migration was checked against.
        policy: AutoCreate,
        /// Every delta the policy does not allow.
        deltas: Vec<RejectedDelta>,
    },

    /// The live database does not match the declared configuration.
    #[error("database {database} does not match the configuration, missing changes:\n{ddl}")]
    ConfigurationMismatch {
        /// Identifier of the database that was checked.
        database: String,
        /// Forward DDL that would reconcile the database.
        ddl: String,
    },

    /// The global lock could not be attained.
    #[error("could not attain the global lock {lock_id} for database {database} after {attempts} attempt(s): {reason}")]
    LockUnavailable {
        /// Identifier of the database.
        database: String,
        /// Lock identifier that was requested.
        lock_id: i64,
        /// Number of lock attempts made.
        attempts: u32,
        /// Why the last attempt failed.
        reason: LockFailureReason,
    },

    /// The engine rejected a DDL statement.
    #[error("statement failed: {message}\n{statement}")]
    StatementFailed {
        /// The SQL that was sent.
        statement: String,
        /// Engine error message.
        message: String,
    },

    /// A feature identity was requested that nobody registered.
    #[error("unknown feature: {feature}")]
    UnknownFeature {
        /// The requested identity.
        feature: String,
    },

    /// A feature depends on itself through its dependency chain.
    #[error("feature dependency cycle: {}", .path.join(" -> "))]
    FeatureCycle {
        /// Feature identities along the cycle, first and last equal.
        path: Vec<String>,
    },

    /// Timed out waiting for the in-process schema lock.
    #[error("timed out after {timeout:?} waiting for the schema lock of {feature}")]
    LocalLockTimeout {
        /// Feature being ensured.
        feature: String,
        /// The configured wait timeout.
        timeout: Duration,
    },

    /// Opening or using a connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Reading the live structure of an object failed.
    #[error("probe failed for {object}: {message}")]
    Probe {
        /// Fully qualified name of the probed object.
        object: String,
        /// Error message.
        message: String,
    },

    /// An identifier failed validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// IO error while writing migration files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A configured engine name is not recognised.
    #[error("configuration error: unknown engine kind: {0}")]
    UnknownEngine(String),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Create a statement failure.
    pub fn statement(statement: impl Into<String>, message: impl Into<String>) -> Self {
        Error::StatementFailed {
            statement: statement.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from the policy gate or a configuration check.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::ValidationFailed { .. } | Error::ConfigurationMismatch { .. }
        )
    }
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, Error>;
