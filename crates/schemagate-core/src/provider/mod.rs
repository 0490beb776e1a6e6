//! Engine providers.
//!
//! A [`Provider`] answers everything engine-specific: identifier quoting and
//! parsing, type mapping, catalog probe queries and the SQL for each DDL
//! [`Fragment`]. The reconciliation engine is written once against this trait.

mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;
mod standard;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    DbObjectName, ForeignKey, Function, IndexDefinition, ObjectKind, Sequence, Table,
    TableColumn, TablePartition, View,
};
use crate::writer::{CopyPage, CopyRows};

pub use mysql::MySqlProvider;
pub use oracle::OracleProvider;
pub use postgres::PostgresProvider;
pub use sqlite::SqliteProvider;
pub use sqlserver::SqlServerProvider;

/// Supported engine families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineKind {
    /// PostgreSQL and wire-compatible engines.
    Postgres,
    /// Microsoft SQL Server.
    SqlServer,
    /// MySQL and MariaDB.
    MySql,
    /// Oracle.
    Oracle,
    /// SQLite.
    Sqlite,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Postgres => write!(f, "postgres"),
            EngineKind::SqlServer => write!(f, "sqlserver"),
            EngineKind::MySql => write!(f, "mysql"),
            EngineKind::Oracle => write!(f, "oracle"),
            EngineKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(EngineKind::Postgres),
            "sqlserver" | "mssql" => Ok(EngineKind::SqlServer),
            "mysql" | "mariadb" => Ok(EngineKind::MySql),
            "oracle" => Ok(EngineKind::Oracle),
            "sqlite" => Ok(EngineKind::Sqlite),
            other => Err(Error::UnknownEngine(other.to_string())),
        }
    }
}

/// Build the provider for an engine with its default settings.
pub fn provider_for(kind: EngineKind) -> Arc<dyn Provider> {
    match kind {
        EngineKind::Postgres => Arc::new(PostgresProvider::new()),
        EngineKind::SqlServer => Arc::new(SqlServerProvider::new()),
        EngineKind::MySql => Arc::new(MySqlProvider::new()),
        EngineKind::Oracle => Arc::new(OracleProvider::new()),
        EngineKind::Sqlite => Arc::new(SqliteProvider::new()),
    }
}

/// What an engine can do in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Declarative table partitioning.
    pub partitioning: bool,
    /// Partitions are declared inside CREATE TABLE rather than as tables.
    pub inline_partitions: bool,
    /// ALTER COLUMN can change a column type.
    pub alter_column_type: bool,
    /// Constraints and column attributes can be altered without a rebuild.
    pub alter_constraints: bool,
    /// Named schemas (namespaces) exist.
    pub schemas: bool,
    /// Functions can be replaced without dropping them first.
    pub create_or_replace_function: bool,
    /// Sequences exist as standalone objects.
    pub sequences: bool,
}

/// A DDL construct to render.
#[derive(Debug, Clone, Copy)]
pub enum Fragment<'a> {
    /// Create a schema if missing.
    CreateSchema { schema: &'a str },
    /// Create a table with its columns, checks and primary key.
    CreateTable { table: &'a Table },
    /// Drop a table.
    DropTable { name: &'a DbObjectName },
    /// Rename a table within its schema.
    RenameTable { from: &'a DbObjectName, to: &'a str },
    /// Add a column.
    AddColumn { table: &'a DbObjectName, column: &'a TableColumn },
    /// Drop a column.
    DropColumn { table: &'a DbObjectName, column: &'a str },
    /// Change a column's type.
    AlterColumnType { table: &'a DbObjectName, column: &'a TableColumn },
    /// Change a column's nullability to the column's declared value.
    SetNullability { table: &'a DbObjectName, column: &'a TableColumn },
    /// Set a column's default to the column's declared value.
    SetDefault { table: &'a DbObjectName, column: &'a TableColumn },
    /// Remove a column's default.
    DropDefault { table: &'a DbObjectName, column: &'a TableColumn },
    /// Add the column's check constraint.
    AddCheck { table: &'a DbObjectName, column: &'a TableColumn },
    /// Drop a column's check constraint.
    DropCheck { table: &'a DbObjectName, column: &'a str },
    /// Add a primary key constraint.
    AddPrimaryKey { table: &'a DbObjectName, name: &'a str, columns: &'a [String] },
    /// Drop a primary key constraint.
    DropPrimaryKey { table: &'a DbObjectName, name: &'a str },
    /// Create an index.
    CreateIndex { table: &'a DbObjectName, index: &'a IndexDefinition },
    /// Drop an index.
    DropIndex { table: &'a DbObjectName, index: &'a IndexDefinition },
    /// Add a foreign key.
    AddForeignKey { table: &'a DbObjectName, foreign_key: &'a ForeignKey },
    /// Drop a foreign key.
    DropForeignKey { table: &'a DbObjectName, name: &'a str },
    /// Add a partition to a partitioned table.
    CreatePartition { table: &'a Table, partition: &'a TablePartition },
    /// Remove a partition from a partitioned table.
    DropPartition { table: &'a Table, partition: &'a TablePartition },
    /// Copy rows for a rebuild, optionally one page at a time.
    CopyRows { copy: &'a CopyRows, page: Option<CopyPage> },
    /// Create a sequence.
    CreateSequence { sequence: &'a Sequence },
    /// Drop a sequence.
    DropSequence { name: &'a DbObjectName },
    /// Create (or replace) a function.
    CreateFunction { function: &'a Function },
    /// Drop a function.
    DropFunction { function: &'a Function },
    /// Create a view.
    CreateView { view: &'a View },
    /// Drop a view.
    DropView { name: &'a DbObjectName },
}

/// Engine-specific SQL generation and catalog access.
pub trait Provider: Send + Sync + fmt::Debug {
    /// Engine family.
    fn kind(&self) -> EngineKind;

    /// Schema used for unqualified names.
    fn default_schema(&self) -> &str;

    /// What the engine can alter in place.
    fn capabilities(&self) -> Capabilities;

    /// Quote one identifier part.
    fn quote(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Map a portable type name (`string`, `uuid`, `json`, ...) to the engine type.
    ///
    /// Applied when a column is declared through
    /// [`TableColumn::portable`](crate::model::TableColumn::portable). Rendering
    /// writes `column_type` verbatim.
    fn map_type(&self, generic: &str) -> String;

    /// Catalog query reading the live structure of one object.
    fn probe_sql(&self, kind: ObjectKind, name: &DbObjectName) -> String {
        standard::probe_sql(self, kind, name)
    }

    /// Render one DDL fragment. An empty string means the engine has no
    /// equivalent and nothing is written.
    fn render(&self, fragment: &Fragment<'_>) -> String {
        standard::render(self, fragment)
    }

    /// Parse `schema.name` or `name` into a qualified name.
    fn parse_identifier(&self, raw: &str) -> Result<DbObjectName> {
        DbObjectName::parse(raw, self.default_schema())
    }

    /// Quoted, schema-qualified form of a name.
    fn qualify(&self, name: &DbObjectName) -> String {
        format!("{}.{}", self.quote(&name.schema), self.quote(&name.name))
    }

    /// Column definition as used in CREATE TABLE and ADD COLUMN.
    fn column_definition(&self, _table: &DbObjectName, column: &TableColumn) -> String {
        standard::column_definition(self, column)
    }

    /// Clause appended to CREATE TABLE for a partitioned table.
    fn partition_clause(&self, _table: &Table) -> String {
        String::new()
    }
}

/// Name of the check constraint attached to a column.
pub fn check_constraint_name(table: &DbObjectName, column: &str) -> String {
    format!("ck_{}_{}", table.name, column)
}

/// Quote a string as a SQL literal.
pub(crate) fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
