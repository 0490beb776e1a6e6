//! Views.

use serde::{Deserialize, Serialize};

use super::column::collapse_whitespace;
use super::identifier::DbObjectName;
use super::{ObjectKind, SchemaObject};
use crate::delta::{ComparableObject, Delta, Difference, ObjectDelta};
use crate::error::{Error, Result};
use crate::probe::{ActualObject, ProbeResult};
use crate::provider::{Fragment, Provider};
use crate::writer::DdlWriter;

/// A declared view over a SELECT statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    /// Qualified view name.
    pub identifier: DbObjectName,
    /// The SELECT statement.
    pub sql: String,
}

impl View {
    /// Create a view.
    pub fn new(identifier: DbObjectName, sql: impl Into<String>) -> Self {
        Self {
            identifier,
            sql: sql.into(),
        }
    }

    fn normalized_sql(&self) -> String {
        collapse_whitespace(&self.sql)
            .trim_end_matches(';')
            .trim()
            .to_string()
    }
}

impl SchemaObject for View {
    fn identifier(&self) -> &DbObjectName {
        &self.identifier
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::View
    }

    fn write_create(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        writer.write(provider.render(&Fragment::CreateView { view: self }));
    }

    fn write_drop(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        writer.write(provider.render(&Fragment::DropView {
            name: &self.identifier,
        }));
    }

    fn create_delta(&self, probe: &ProbeResult) -> Result<ObjectDelta> {
        let actual = match probe.get(&self.identifier) {
            None => None,
            Some(ActualObject::View(view)) => Some(view.clone()),
            Some(other) => {
                return Err(Error::Probe {
                    object: self.identifier.qualified_name(),
                    message: format!("expected a view, found a {}", other.kind()),
                })
            }
        };
        Ok(ObjectDelta::View(Delta::new(self.clone(), actual)))
    }
}

impl ComparableObject for View {
    fn difference_from(&self, actual: Option<&Self>) -> Difference {
        match actual {
            None => Difference::Create,
            Some(actual) if actual.normalized_sql() == self.normalized_sql() => Difference::None,
            Some(_) => Difference::Update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_sql_comparison() {
        let name = DbObjectName::new("public", "active_people").unwrap();
        let view = View::new(name.clone(), "SELECT id, name FROM people WHERE active");
        let same = View::new(name.clone(), "SELECT id,  name\nFROM people WHERE active;");
        let different = View::new(name, "SELECT id FROM people");

        assert_eq!(view.difference_from(Some(&same)), Difference::None);
        assert_eq!(view.difference_from(Some(&different)), Difference::Update);
        assert_eq!(view.difference_from(None), Difference::Create);
    }

    #[test]
    fn test_literal_case_change_is_an_update() {
        let name = DbObjectName::new("public", "admins").unwrap();
        let view = View::new(name.clone(), "SELECT id FROM people WHERE role = 'Admin'");
        let lowered = View::new(name, "SELECT id FROM people WHERE role = 'admin'");
        assert_eq!(view.difference_from(Some(&lowered)), Difference::Update);
    }
}
