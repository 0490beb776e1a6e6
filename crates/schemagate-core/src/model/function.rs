//! Stored functions.

use serde::{Deserialize, Serialize};

use super::column::collapse_whitespace;
use super::identifier::DbObjectName;
use super::{ObjectKind, SchemaObject};
use crate::delta::{ComparableObject, Delta, Difference, ObjectDelta};
use crate::error::{Error, Result};
use crate::probe::{ActualObject, ProbeResult};
use crate::provider::{Fragment, Provider};
use crate::writer::DdlWriter;

/// A declared stored function.
///
/// `body` holds the complete definition statement. A function without a body
/// is declared for removal: applying it drops the live function if present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Qualified function name.
    pub identifier: DbObjectName,
    /// Full definition statement.
    pub body: Option<String>,
    /// Argument list used when dropping, e.g. `(jsonb, uuid)`.
    pub signature: Option<String>,
}

impl Function {
    /// Declare a function with its definition.
    pub fn new(identifier: DbObjectName, body: impl Into<String>) -> Self {
        Self {
            identifier,
            body: Some(body.into()),
            signature: None,
        }
    }

    /// Declare that a function should no longer exist.
    pub fn for_removal(identifier: DbObjectName) -> Self {
        Self {
            identifier,
            body: None,
            signature: None,
        }
    }

    /// Set the argument list used when dropping.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    fn normalized_body(&self) -> Option<String> {
        self.body.as_deref().map(|body| {
            collapse_whitespace(body)
                .trim_end_matches(';')
                .trim()
                .to_string()
        })
    }
}

impl SchemaObject for Function {
    fn identifier(&self) -> &DbObjectName {
        &self.identifier
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Function
    }

    fn write_create(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        if self.body.is_some() {
            writer.write(provider.render(&Fragment::CreateFunction { function: self }));
        }
    }

    fn write_drop(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        writer.write(provider.render(&Fragment::DropFunction { function: self }));
    }

    fn create_delta(&self, probe: &ProbeResult) -> Result<ObjectDelta> {
        let actual = match probe.get(&self.identifier) {
            None => None,
            Some(ActualObject::Function(function)) => Some(function.clone()),
            Some(other) => {
                return Err(Error::Probe {
                    object: self.identifier.qualified_name(),
                    message: format!("expected a function, found a {}", other.kind()),
                })
            }
        };
        Ok(ObjectDelta::Function(Delta::new(self.clone(), actual)))
    }
}

impl ComparableObject for Function {
    fn difference_from(&self, actual: Option<&Self>) -> Difference {
        match (self.body.is_some(), actual) {
            (false, Some(_)) => Difference::Update,
            (false, None) => Difference::None,
            (true, None) => Difference::Create,
            (true, Some(actual)) => {
                if self.normalized_body() == actual.normalized_body() {
                    Difference::None
                } else {
                    Difference::Update
                }
            }
        }
    }

    fn write_replace(&self, actual: &Self, provider: &dyn Provider, writer: &mut DdlWriter) {
        if !provider.capabilities().create_or_replace_function {
            actual.write_drop(provider, writer);
        }
        self.write_create(provider, writer);
    }

    fn is_for_removal(&self) -> bool {
        self.body.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name() -> DbObjectName {
        DbObjectName::new("public", "mt_upsert_people").unwrap()
    }

    const BODY: &str = "CREATE OR REPLACE FUNCTION public.mt_upsert_people(doc jsonb) RETURNS void AS $$ BEGIN END; $$ LANGUAGE plpgsql";

    #[test]
    fn test_body_comparison_normalizes_whitespace() {
        let expected = Function::new(name(), BODY);
        let actual = Function::new(name(), BODY.replace(' ', "  \n"));
        assert_eq!(expected.difference_from(Some(&actual)), Difference::None);

        let changed = Function::new(name(), BODY.replace("void", "integer"));
        assert_eq!(expected.difference_from(Some(&changed)), Difference::Update);
        assert_eq!(expected.difference_from(None), Difference::Create);
    }

    #[test]
    fn test_literal_case_change_is_an_update() {
        let definition = "CREATE FUNCTION public.role() RETURNS text AS $$ SELECT 'Admin' $$ LANGUAGE sql";
        let expected = Function::new(name(), definition);
        let actual = Function::new(name(), definition.replace("'Admin'", "'admin'"));
        assert_eq!(expected.difference_from(Some(&actual)), Difference::Update);
    }

    #[test]
    fn test_for_removal() {
        let removal = Function::for_removal(name());
        assert!(removal.is_for_removal());
        assert_eq!(
            removal.difference_from(Some(&Function::new(name(), BODY))),
            Difference::Update
        );
        assert_eq!(removal.difference_from(None), Difference::None);
    }
}
