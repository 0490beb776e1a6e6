//! Sequences.

use serde::{Deserialize, Serialize};

use super::identifier::DbObjectName;
use super::{ObjectKind, SchemaObject};
use crate::delta::{ComparableObject, Delta, Difference, ObjectDelta};
use crate::error::{Error, Result};
use crate::probe::{ActualObject, ProbeResult};
use crate::provider::{Fragment, Provider};
use crate::writer::DdlWriter;

/// A declared sequence. Sequences are never altered once they exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Qualified sequence name.
    pub identifier: DbObjectName,
    /// First value handed out.
    pub start_with: Option<i64>,
    /// Owning table and column.
    pub owner: Option<(DbObjectName, String)>,
}

impl Sequence {
    /// Create a sequence starting at the engine default.
    pub fn new(identifier: DbObjectName) -> Self {
        Self {
            identifier,
            start_with: None,
            owner: None,
        }
    }

    /// Set the first value.
    pub fn starting_with(mut self, start: i64) -> Self {
        self.start_with = Some(start);
        self
    }

    /// Tie the sequence's lifetime to a table column.
    pub fn owned_by(mut self, table: DbObjectName, column: impl Into<String>) -> Self {
        self.owner = Some((table, column.into()));
        self
    }
}

impl SchemaObject for Sequence {
    fn identifier(&self) -> &DbObjectName {
        &self.identifier
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Sequence
    }

    fn write_create(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        writer.write(provider.render(&Fragment::CreateSequence { sequence: self }));
    }

    fn write_drop(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        writer.write(provider.render(&Fragment::DropSequence {
            name: &self.identifier,
        }));
    }

    fn create_delta(&self, probe: &ProbeResult) -> Result<ObjectDelta> {
        let actual = match probe.get(&self.identifier) {
            None => None,
            Some(ActualObject::Sequence(sequence)) => Some(sequence.clone()),
            Some(other) => {
                return Err(Error::Probe {
                    object: self.identifier.qualified_name(),
                    message: format!("expected a sequence, found a {}", other.kind()),
                })
            }
        };
        Ok(ObjectDelta::Sequence(Delta::new(self.clone(), actual)))
    }
}

impl ComparableObject for Sequence {
    fn difference_from(&self, actual: Option<&Self>) -> Difference {
        match actual {
            Some(_) => Difference::None,
            None => Difference::Create,
        }
    }
}
