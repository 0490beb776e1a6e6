//! Catalog probes: what to read from the live database and what came back.

use std::collections::HashMap;

use crate::model::{DbObjectName, Function, ObjectKind, Sequence, Table, View};
use crate::provider::{Capabilities, Provider};

/// One catalog lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    /// Kind of object looked up.
    pub kind: ObjectKind,
    /// Name looked up.
    pub name: DbObjectName,
    /// Engine catalog query for the lookup.
    pub sql: String,
}

/// Collects probe requests from schema objects.
#[derive(Debug, Default)]
pub struct ProbeBuilder {
    requests: Vec<ProbeRequest>,
}

impl ProbeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a lookup. Duplicate names are collapsed.
    pub fn request(&mut self, provider: &dyn Provider, kind: ObjectKind, name: DbObjectName) {
        if self.requests.iter().any(|r| r.name == name) {
            return;
        }
        let sql = provider.probe_sql(kind, &name);
        self.requests.push(ProbeRequest { kind, name, sql });
    }

    /// Finish into a batch.
    pub fn build(self) -> ProbeBatch {
        ProbeBatch {
            requests: self.requests,
        }
    }
}

/// A batch of lookups sent in one round trip.
#[derive(Debug, Clone, Default)]
pub struct ProbeBatch {
    /// The lookups, in registration order.
    pub requests: Vec<ProbeRequest>,
}

impl ProbeBatch {
    /// Number of lookups.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// All catalog queries joined into one command text.
    pub fn command_text(&self) -> String {
        self.requests
            .iter()
            .map(|r| r.sql.trim_end_matches(';').to_string())
            .collect::<Vec<_>>()
            .join(";\n")
    }
}

/// Live structure of one object as read from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum ActualObject {
    /// A table.
    Table(Table),
    /// A sequence.
    Sequence(Sequence),
    /// A function.
    Function(Function),
    /// A view.
    View(View),
}

impl ActualObject {
    /// Kind of the object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            ActualObject::Table(_) => ObjectKind::Table,
            ActualObject::Sequence(_) => ObjectKind::Sequence,
            ActualObject::Function(_) => ObjectKind::Function,
            ActualObject::View(_) => ObjectKind::View,
        }
    }

    /// Qualified name of the object.
    pub fn identifier(&self) -> &DbObjectName {
        match self {
            ActualObject::Table(t) => &t.identifier,
            ActualObject::Sequence(s) => &s.identifier,
            ActualObject::Function(f) => &f.identifier,
            ActualObject::View(v) => &v.identifier,
        }
    }
}

/// Objects found by a probe batch, keyed case-insensitively by name.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    capabilities: Capabilities,
    objects: HashMap<String, ActualObject>,
}

impl ProbeResult {
    /// Build a result for an engine with the given capabilities.
    pub fn new(capabilities: Capabilities, objects: Vec<ActualObject>) -> Self {
        let objects = objects
            .into_iter()
            .map(|o| (o.identifier().key(), o))
            .collect();
        Self {
            capabilities,
            objects,
        }
    }

    /// The live object with this name.
    pub fn get(&self, name: &DbObjectName) -> Option<&ActualObject> {
        self.objects.get(&name.key())
    }

    /// Capabilities of the engine the probe ran against.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Number of objects found.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
