//! Declared database structure.
//!
//! Every declared unit implements [`SchemaObject`]: it can write its own
//! create/drop DDL through a [`Provider`], register what needs probing, and
//! turn a probe result into an [`ObjectDelta`].

mod column;
mod foreign_key;
mod function;
mod identifier;
mod index;
mod partitioning;
mod sequence;
mod table;
mod view;

use std::fmt;

use crate::delta::ObjectDelta;
use crate::error::Result;
use crate::probe::{ProbeBuilder, ProbeResult};
use crate::provider::Provider;
use crate::writer::DdlWriter;

pub use column::{canonical_type, TableColumn};
pub use foreign_key::{CascadeAction, ForeignKey};
pub use function::Function;
pub use identifier::{validate_identifier, DbObjectName};
pub use index::{IndexDefinition, SortOrder};
pub use partitioning::{
    HashPartitioning, ListPartition, ListPartitioning, PartitionStrategy, Partitioning,
    RangePartition, RangePartitioning, TablePartition,
};
pub use sequence::Sequence;
pub use table::Table;
pub use view::View;

pub(crate) use column::collapse_whitespace;
pub(crate) use identifier::{same_name, same_names};

/// Kind of a declared object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A table with its columns, keys, indexes and partitions.
    Table,
    /// A sequence.
    Sequence,
    /// A stored function.
    Function,
    /// A view.
    View,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Table => write!(f, "table"),
            ObjectKind::Sequence => write!(f, "sequence"),
            ObjectKind::Function => write!(f, "function"),
            ObjectKind::View => write!(f, "view"),
        }
    }
}

/// The smallest declared unit of database structure.
pub trait SchemaObject: Send + Sync + fmt::Debug {
    /// Qualified name of the object.
    fn identifier(&self) -> &DbObjectName;

    /// Kind of the object.
    fn kind(&self) -> ObjectKind;

    /// Write the DDL that creates the object.
    fn write_create(&self, provider: &dyn Provider, writer: &mut DdlWriter);

    /// Write the DDL that drops the object.
    fn write_drop(&self, provider: &dyn Provider, writer: &mut DdlWriter);

    /// Register the catalog lookups needed to compute this object's delta.
    fn configure_probe(&self, provider: &dyn Provider, builder: &mut ProbeBuilder) {
        builder.request(provider, self.kind(), self.identifier().clone());
    }

    /// Compare against the probed live structure.
    fn create_delta(&self, probe: &ProbeResult) -> Result<ObjectDelta>;

    /// Every database name this object occupies.
    fn all_names(&self) -> Vec<DbObjectName> {
        vec![self.identifier().clone()]
    }
}
