//! Name-matched comparison of table parts.

use crate::model::{same_name, ForeignKey, IndexDefinition, TableColumn};

/// A table part matched by name and compared structurally.
pub trait NamedItem: Clone {
    /// Name the part is matched by.
    fn item_name(&self) -> &str;

    /// Structural equality.
    fn same_structure(&self, other: &Self) -> bool;
}

impl NamedItem for TableColumn {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn same_structure(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl NamedItem for IndexDefinition {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn same_structure(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl NamedItem for ForeignKey {
    fn item_name(&self) -> &str {
        &self.name
    }

    fn same_structure(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

/// A part present on both sides that differs.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChange<T> {
    /// Declared version.
    pub expected: T,
    /// Live version.
    pub actual: T,
}

/// Comparison of two sets of table parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSetDelta<T> {
    /// Declared, absent from the live table.
    pub missing: Vec<T>,
    /// Live, not declared.
    pub extras: Vec<T>,
    /// Present on both sides with different structure.
    pub different: Vec<ItemChange<T>>,
    /// Present on both sides and equal.
    pub matched: Vec<T>,
}

impl<T: NamedItem> ItemSetDelta<T> {
    /// Match `expected` against `actual` by case-insensitive name.
    pub fn compute(expected: &[T], actual: &[T]) -> Self {
        let mut delta = Self {
            missing: Vec::new(),
            extras: Vec::new(),
            different: Vec::new(),
            matched: Vec::new(),
        };

        for item in expected {
            match actual.iter().find(|a| same_name(a.item_name(), item.item_name())) {
                None => delta.missing.push(item.clone()),
                Some(live) if item.same_structure(live) => delta.matched.push(item.clone()),
                Some(live) => delta.different.push(ItemChange {
                    expected: item.clone(),
                    actual: live.clone(),
                }),
            }
        }

        delta.extras = actual
            .iter()
            .filter(|a| !expected.iter().any(|e| same_name(e.item_name(), a.item_name())))
            .cloned()
            .collect();

        delta
    }

    /// Whether anything is missing, extra or different.
    pub fn has_changes(&self) -> bool {
        !self.missing.is_empty() || !self.extras.is_empty() || !self.different.is_empty()
    }

    /// Declared versions of the missing and different parts.
    pub fn to_create(&self) -> impl Iterator<Item = &T> {
        self.missing
            .iter()
            .chain(self.different.iter().map(|c| &c.expected))
    }

    /// Live versions of the extra and different parts.
    pub fn to_remove(&self) -> impl Iterator<Item = &T> {
        self.extras
            .iter()
            .chain(self.different.iter().map(|c| &c.actual))
    }
}
