//! Index definitions.

use serde::{Deserialize, Serialize};

use super::column::normalize_expression;
use super::identifier::{same_name, same_names};

/// Sort direction of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending (engine default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// An index on a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name, unique within the table's schema.
    pub name: String,
    /// Indexed columns or expressions, in order.
    pub columns: Vec<String>,
    /// Sort direction applied to the index columns.
    pub sort_order: SortOrder,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Partial-index predicate.
    pub predicate: Option<String>,
    /// Index access method (e.g. `btree`, `gin`); None means the engine default.
    pub method: Option<String>,
    /// Fill factor percentage.
    pub fill_factor: Option<u8>,
}

impl IndexDefinition {
    /// Create a plain ascending index.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            sort_order: SortOrder::Asc,
            unique: false,
            predicate: None,
            method: None,
            fill_factor: None,
        }
    }

    /// Create an index named `idx_{table}_{columns}`.
    pub fn for_columns(table: &str, columns: &[&str]) -> Self {
        let name = format!("idx_{}_{}", table, columns.join("_"));
        Self::new(name, columns.iter().map(|c| c.to_string()).collect())
    }

    /// Mark as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sort descending.
    pub fn descending(mut self) -> Self {
        self.sort_order = SortOrder::Desc;
        self
    }

    /// Set a partial-index predicate.
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Set the access method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the fill factor.
    pub fn with_fill_factor(mut self, fill_factor: u8) -> Self {
        self.fill_factor = Some(fill_factor);
        self
    }

    /// Structural equality used by the delta algorithm.
    pub fn matches(&self, other: &IndexDefinition) -> bool {
        same_name(&self.name, &other.name)
            && same_names(&self.columns, &other.columns)
            && self.sort_order == other.sort_order
            && self.unique == other.unique
            && self.predicate.as_deref().map(normalize_expression)
                == other.predicate.as_deref().map(normalize_expression)
            && method_matches(&self.method, &other.method)
            && self.fill_factor == other.fill_factor
    }
}

fn method_matches(a: &Option<String>, b: &Option<String>) -> bool {
    let a = a.as_deref().unwrap_or("btree");
    let b = b.as_deref().unwrap_or("btree");
    same_name(a, b)
}
