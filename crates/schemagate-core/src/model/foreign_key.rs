//! Foreign key constraints.

use serde::{Deserialize, Serialize};

use super::identifier::{same_name, same_names, DbObjectName};

/// Referential action on delete or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CascadeAction {
    /// Reject the change (engine default).
    #[default]
    NoAction,
    /// Reject the change immediately.
    Restrict,
    /// Propagate the change.
    Cascade,
    /// Set referencing columns to NULL.
    SetNull,
    /// Set referencing columns to their default.
    SetDefault,
}

impl CascadeAction {
    /// SQL keyword for this action.
    pub fn as_sql(&self) -> &'static str {
        match self {
            CascadeAction::NoAction => "NO ACTION",
            CascadeAction::Restrict => "RESTRICT",
            CascadeAction::Cascade => "CASCADE",
            CascadeAction::SetNull => "SET NULL",
            CascadeAction::SetDefault => "SET DEFAULT",
        }
    }
}

/// A foreign key from one table to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Referencing columns, in order.
    pub columns: Vec<String>,
    /// Referenced table.
    pub linked_table: DbObjectName,
    /// Referenced columns, in order.
    pub linked_columns: Vec<String>,
    /// Action on delete of the referenced row.
    pub on_delete: CascadeAction,
    /// Action on update of the referenced key.
    pub on_update: CascadeAction,
}

impl ForeignKey {
    /// Create a foreign key with default actions.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        linked_table: DbObjectName,
        linked_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            linked_table,
            linked_columns,
            on_delete: CascadeAction::NoAction,
            on_update: CascadeAction::NoAction,
        }
    }

    /// Set the on-delete action.
    pub fn on_delete(mut self, action: CascadeAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Set the on-update action.
    pub fn on_update(mut self, action: CascadeAction) -> Self {
        self.on_update = action;
        self
    }

    /// Structural equality used by the delta algorithm.
    pub fn matches(&self, other: &ForeignKey) -> bool {
        same_name(&self.name, &other.name)
            && same_names(&self.columns, &other.columns)
            && same_names(&self.linked_columns, &other.linked_columns)
            && self.linked_table == other.linked_table
            && self.on_delete == other.on_delete
            && self.on_update == other.on_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> DbObjectName {
        DbObjectName::new("public", "people").unwrap()
    }

    #[test]
    fn test_matches() {
        let fk = ForeignKey::new("fk_orders_people", vec!["person_id".into()], people(), vec!["id".into()])
            .on_delete(CascadeAction::Cascade);

        let mut same = fk.clone();
        same.linked_table = DbObjectName::new("PUBLIC", "People").unwrap();
        assert!(fk.matches(&same));

        let different = fk.clone().on_delete(CascadeAction::SetNull);
        assert!(!fk.matches(&different));
    }

    #[test]
    fn test_linked_table_matters() {
        let fk = ForeignKey::new("fk", vec!["a".into()], people(), vec!["id".into()]);
        let mut other = fk.clone();
        other.linked_table = DbObjectName::new("public", "companies").unwrap();
        assert!(!fk.matches(&other));
    }
}
