//! Differences between declared objects and their live counterparts.

mod items;
mod partition;
mod table;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{DbObjectName, Function, ObjectKind, SchemaObject, Sequence, View};
use crate::provider::Provider;
use crate::writer::DdlWriter;

pub use items::{ItemChange, ItemSetDelta, NamedItem};
pub use partition::PartitionDelta;
pub use table::TableDelta;

/// Severity of a difference, ordered so that `max` is the worst case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difference {
    /// Live structure matches.
    None,
    /// Object is missing and can be created.
    Create,
    /// Object exists and can be altered in place or rebuilt.
    Update,
    /// Object exists and cannot be brought in line without recreating it.
    Invalid,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::None => write!(f, "None"),
            Difference::Create => write!(f, "Create"),
            Difference::Update => write!(f, "Update"),
            Difference::Invalid => write!(f, "Invalid"),
        }
    }
}

/// Objects whose comparison is a single verdict rather than a set of parts.
pub trait ComparableObject: SchemaObject + Clone {
    /// Severity of the difference from the live object.
    fn difference_from(&self, actual: Option<&Self>) -> Difference;

    /// Write the DDL that replaces `actual` with `self`.
    fn write_replace(&self, actual: &Self, provider: &dyn Provider, writer: &mut DdlWriter) {
        actual.write_drop(provider, writer);
        self.write_create(provider, writer);
    }

    /// Whether the declaration only asks for the object to be removed.
    fn is_for_removal(&self) -> bool {
        false
    }
}

/// Comparison of one declared object with its live counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta<T> {
    /// The declared object.
    pub expected: T,
    /// The live object, if any.
    pub actual: Option<T>,
    difference: Difference,
}

impl<T: ComparableObject> Delta<T> {
    /// Compare; the difference is fixed here.
    pub fn new(expected: T, actual: Option<T>) -> Self {
        let difference = expected.difference_from(actual.as_ref());
        Self {
            expected,
            actual,
            difference,
        }
    }

    /// Severity of the difference.
    pub fn difference(&self) -> Difference {
        self.difference
    }

    /// Forward DDL.
    pub fn write_update(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        match (self.difference, &self.actual) {
            (Difference::None, _) => {}
            (Difference::Create, _) | (_, None) => self.expected.write_create(provider, writer),
            (_, Some(actual)) => {
                if self.expected.is_for_removal() {
                    actual.write_drop(provider, writer);
                } else {
                    self.expected.write_replace(actual, provider, writer);
                }
            }
        }
    }

    /// Inverse of [`Delta::write_update`].
    pub fn write_rollback(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        match (self.difference, &self.actual) {
            (Difference::None, _) => {}
            (Difference::Create, _) | (_, None) => self.expected.write_drop(provider, writer),
            (_, Some(actual)) => {
                if self.expected.is_for_removal() {
                    actual.write_create(provider, writer);
                } else {
                    actual.write_replace(&self.expected, provider, writer);
                }
            }
        }
    }
}

/// The delta of any declared object, selected by kind.
#[derive(Debug, Clone)]
pub enum ObjectDelta {
    /// Table delta with per-part detail.
    Table(TableDelta),
    /// Sequence delta.
    Sequence(Delta<Sequence>),
    /// Function delta.
    Function(Delta<Function>),
    /// View delta.
    View(Delta<View>),
}

impl ObjectDelta {
    /// Name of the declared object.
    pub fn identifier(&self) -> &DbObjectName {
        match self {
            ObjectDelta::Table(d) => &d.expected.identifier,
            ObjectDelta::Sequence(d) => &d.expected.identifier,
            ObjectDelta::Function(d) => &d.expected.identifier,
            ObjectDelta::View(d) => &d.expected.identifier,
        }
    }

    /// Kind of the declared object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectDelta::Table(_) => ObjectKind::Table,
            ObjectDelta::Sequence(_) => ObjectKind::Sequence,
            ObjectDelta::Function(_) => ObjectKind::Function,
            ObjectDelta::View(_) => ObjectKind::View,
        }
    }

    /// Severity of the difference.
    pub fn difference(&self) -> Difference {
        match self {
            ObjectDelta::Table(d) => d.difference(),
            ObjectDelta::Sequence(d) => d.difference(),
            ObjectDelta::Function(d) => d.difference(),
            ObjectDelta::View(d) => d.difference(),
        }
    }

    /// Forward DDL.
    pub fn write_update(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        match self {
            ObjectDelta::Table(d) => d.write_update(provider, writer),
            ObjectDelta::Sequence(d) => d.write_update(provider, writer),
            ObjectDelta::Function(d) => d.write_update(provider, writer),
            ObjectDelta::View(d) => d.write_update(provider, writer),
        }
    }

    /// Inverse of the forward DDL.
    pub fn write_rollback(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        match self {
            ObjectDelta::Table(d) => d.write_rollback(provider, writer),
            ObjectDelta::Sequence(d) => d.write_rollback(provider, writer),
            ObjectDelta::Function(d) => d.write_rollback(provider, writer),
            ObjectDelta::View(d) => d.write_rollback(provider, writer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PostgresProvider;
    use crate::writer::DdlStatement;

    #[test]
    fn test_difference_ordering() {
        assert!(Difference::None < Difference::Create);
        assert!(Difference::Create < Difference::Update);
        assert!(Difference::Update < Difference::Invalid);
        let worst = [Difference::Create, Difference::None, Difference::Update]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Difference::Update));
    }

    fn sql(writer: &DdlWriter) -> Vec<String> {
        writer
            .statements()
            .iter()
            .filter_map(|s| match s {
                DdlStatement::Sql(sql) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_function_removal_round_trip() {
        let provider = PostgresProvider::new();
        let name = DbObjectName::new("public", "old_fn").unwrap();
        let live = Function::new(name.clone(), "CREATE OR REPLACE FUNCTION public.old_fn() RETURNS int AS $$ SELECT 1 $$ LANGUAGE sql");
        let delta = Delta::new(Function::for_removal(name), Some(live.clone()));
        assert_eq!(delta.difference(), Difference::Update);

        let mut forward = DdlWriter::new();
        delta.write_update(&provider, &mut forward);
        assert_eq!(sql(&forward), vec!["DROP FUNCTION IF EXISTS \"public\".\"old_fn\" CASCADE"]);

        let mut rollback = DdlWriter::new();
        delta.write_rollback(&provider, &mut rollback);
        assert_eq!(sql(&rollback), vec![live.body.unwrap()]);
    }

    #[test]
    fn test_view_change_is_drop_and_create() {
        let provider = PostgresProvider::new();
        let name = DbObjectName::new("public", "v").unwrap();
        let delta = Delta::new(
            View::new(name.clone(), "SELECT 2"),
            Some(View::new(name, "SELECT 1")),
        );

        let mut forward = DdlWriter::new();
        delta.write_update(&provider, &mut forward);
        assert_eq!(
            sql(&forward),
            vec![
                "DROP VIEW IF EXISTS \"public\".\"v\" CASCADE",
                "CREATE OR REPLACE VIEW \"public\".\"v\" AS SELECT 2"
            ]
        );

        let mut rollback = DdlWriter::new();
        delta.write_rollback(&provider, &mut rollback);
        assert_eq!(sql(&rollback)[1], "CREATE OR REPLACE VIEW \"public\".\"v\" AS SELECT 1");
    }

    #[test]
    fn test_missing_sequence_is_created_and_rolled_back() {
        let provider = PostgresProvider::new();
        let sequence = Sequence::new(DbObjectName::new("public", "numbers").unwrap());
        let delta = ObjectDelta::Sequence(Delta::new(sequence, None));
        assert_eq!(delta.difference(), Difference::Create);
        assert_eq!(delta.kind(), ObjectKind::Sequence);

        let mut rollback = DdlWriter::new();
        delta.write_rollback(&provider, &mut rollback);
        assert_eq!(sql(&rollback), vec!["DROP SEQUENCE IF EXISTS \"public\".\"numbers\""]);
    }
}
