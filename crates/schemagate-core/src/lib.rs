//! schemagate - schema reconciliation for relational databases.
//!
//! Declared tables, sequences, functions and views are compared against the
//! live catalog of a target database. The resulting migration is gated by an
//! [`AutoCreate`] policy and applied under a database-wide advisory lock,
//! or feature by feature under an in-process lock.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use schemagate_core::{
//!     provider_for, Database, DbObjectName, EngineKind, SchemaFeature, Table, TableColumn,
//! };
//!
//! let people = Table::new(DbObjectName::new("crm", "people")?)
//!     .with_column(TableColumn::new("id", "uuid").as_primary_key())
//!     .with_column(TableColumn::new("name", "varchar"));
//!
//! let db = Database::new("crm", provider_for(EngineKind::Postgres), Arc::new(factory))
//!     .with_feature(SchemaFeature::new("people").with_object(people));
//!
//! let outcome = db.apply_all_configured_changes(None).await?;
//! println!("applied {} statements", outcome.statements_executed);
//! ```

pub mod cache;
pub mod config;
pub mod connection;
pub mod database;
pub mod delta;
pub mod error;
pub mod feature;
pub mod lock;
pub mod logger;
pub mod memory;
pub mod migration;
pub mod model;
pub mod probe;
pub mod provider;
pub mod writer;

pub use cache::{FeatureCache, LocalLock};
pub use config::MigrationConfig;
pub use connection::{Connection, ConnectionFactory};
pub use database::{ApplyOutcome, Database};
pub use delta::{Delta, Difference, ObjectDelta, PartitionDelta, TableDelta};
pub use error::{Error, RejectedDelta, Result};
pub use feature::{feature_key, CycleBehavior, Feature, FeatureRegistry, SchemaFeature};
pub use lock::{lock_id_for, AttainLockResult, GlobalLock, LockFailureReason, ReconnectionOptions};
pub use logger::{BestEffortLogger, DefaultMigrationLogger, MigrationLogger};
pub use memory::MemoryDatabase;
pub use migration::{rollback_file_path, AutoCreate, SchemaMigration};
pub use model::{
    CascadeAction, DbObjectName, ForeignKey, Function, IndexDefinition, ListPartition,
    ObjectKind, Partitioning, RangePartition, SchemaObject, Sequence, SortOrder, Table,
    TableColumn, View,
};
pub use probe::{ActualObject, ProbeBatch, ProbeBuilder, ProbeResult};
pub use provider::{
    provider_for, Capabilities, EngineKind, MySqlProvider, OracleProvider, PostgresProvider,
    Provider, SqlServerProvider, SqliteProvider,
};
pub use writer::{DdlStatement, DdlWriter};
