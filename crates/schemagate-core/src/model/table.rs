//! Table definitions.

use serde::{Deserialize, Serialize};

use super::column::TableColumn;
use super::foreign_key::ForeignKey;
use super::identifier::{same_name, DbObjectName};
use super::index::IndexDefinition;
use super::partitioning::{Partitioning, TablePartition};
use super::{ObjectKind, SchemaObject};
use crate::delta::{ObjectDelta, TableDelta};
use crate::error::{Error, Result};
use crate::probe::{ActualObject, ProbeResult};
use crate::provider::{Fragment, Provider};
use crate::writer::DdlWriter;

/// A declared table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Qualified table name.
    pub identifier: DbObjectName,
    /// Columns in declaration order.
    pub columns: Vec<TableColumn>,
    /// Explicit primary key constraint name.
    pub primary_key_name: Option<String>,
    /// Secondary indexes.
    pub indexes: Vec<IndexDefinition>,
    /// Outgoing foreign keys.
    pub foreign_keys: Vec<ForeignKey>,
    /// Partitioning strategy.
    pub partitioning: Partitioning,
}

impl Table {
    /// Create an empty table.
    pub fn new(identifier: DbObjectName) -> Self {
        Self {
            identifier,
            columns: Vec::new(),
            primary_key_name: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            partitioning: Partitioning::None,
        }
    }

    /// Add a column.
    pub fn with_column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Name the primary key constraint explicitly.
    pub fn with_primary_key_name(mut self, name: impl Into<String>) -> Self {
        self.primary_key_name = Some(name.into());
        self
    }

    /// Add an index.
    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// Add a foreign key.
    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Set the partitioning strategy.
    pub fn partitioned_by(mut self, partitioning: Partitioning) -> Self {
        self.partitioning = partitioning;
        self
    }

    /// Look up a column by name, ignoring case.
    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| same_name(&c.name, name))
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Primary key columns in declaration order.
    pub fn primary_key_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Effective primary key constraint name, `pkey_{table}_{columns}` unless set.
    pub fn primary_key_name(&self) -> String {
        match &self.primary_key_name {
            Some(name) => name.clone(),
            None => format!(
                "pkey_{}_{}",
                self.identifier.name,
                self.primary_key_columns().join("_")
            ),
        }
    }

    /// Reasons the declared layout cannot hold its partitioning.
    ///
    /// Every partition column must exist, and a primary key must contain all
    /// of them.
    pub fn partition_conflicts(&self) -> Vec<String> {
        let mut conflicts = Vec::new();
        let primary_key = self.primary_key_columns();

        for column in self.partitioning.columns() {
            if !self.has_column(column) {
                conflicts.push(format!(
                    "partition column {} is not a column of {}",
                    column, self.identifier
                ));
            } else if !primary_key.is_empty() && !primary_key.iter().any(|pk| same_name(pk, column)) {
                conflicts.push(format!(
                    "primary key of {} does not contain partition column {}",
                    self.identifier, column
                ));
            }
        }

        conflicts
    }

    /// Name of the table holding one partition.
    pub fn partition_table_name(&self, partition: &TablePartition) -> DbObjectName {
        self.identifier.with_suffix(partition.suffix())
    }

    /// A copy of the layout under another name, used as the shadow table of a
    /// rebuild. Indexes are always left out; the primary key and foreign keys
    /// only survive when `keep_constraints` is set.
    pub(crate) fn shadow_copy(&self, identifier: DbObjectName, keep_constraints: bool) -> Table {
        let mut shadow = Table {
            identifier,
            columns: self.columns.clone(),
            primary_key_name: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            partitioning: self.partitioning.clone(),
        };
        if keep_constraints {
            shadow.primary_key_name = Some(self.primary_key_name());
            shadow.foreign_keys = self.foreign_keys.clone();
        } else {
            for column in &mut shadow.columns {
                column.primary_key = false;
            }
        }
        shadow
    }

    /// Write the table and its partitions, without indexes or foreign keys.
    pub(crate) fn write_create_table(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        writer.write(provider.render(&Fragment::CreateTable { table: self }));

        if provider.capabilities().partitioning && !provider.capabilities().inline_partitions {
            for partition in self.partitioning.partitions() {
                writer.write(provider.render(&Fragment::CreatePartition {
                    table: self,
                    partition: &partition,
                }));
            }
        }
    }

    /// Write the secondary indexes.
    pub(crate) fn write_indexes(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        for index in &self.indexes {
            writer.write(provider.render(&Fragment::CreateIndex {
                table: &self.identifier,
                index,
            }));
        }
    }

    /// Write the foreign keys.
    pub(crate) fn write_foreign_keys(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        for foreign_key in &self.foreign_keys {
            writer.write(provider.render(&Fragment::AddForeignKey {
                table: &self.identifier,
                foreign_key,
            }));
        }
    }
}

impl SchemaObject for Table {
    fn identifier(&self) -> &DbObjectName {
        &self.identifier
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Table
    }

    fn write_create(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        self.write_create_table(provider, writer);
        self.write_indexes(provider, writer);
        self.write_foreign_keys(provider, writer);
    }

    fn write_drop(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        writer.write(provider.render(&Fragment::DropTable {
            name: &self.identifier,
        }));
    }

    fn create_delta(&self, probe: &ProbeResult) -> Result<ObjectDelta> {
        let actual = match probe.get(&self.identifier) {
            None => None,
            Some(ActualObject::Table(table)) => Some(table),
            Some(other) => {
                return Err(Error::Probe {
                    object: self.identifier.qualified_name(),
                    message: format!("expected a table, found a {}", other.kind()),
                })
            }
        };
        Ok(ObjectDelta::Table(TableDelta::compute(self, actual, probe.capabilities())))
    }

    fn all_names(&self) -> Vec<DbObjectName> {
        let mut names = vec![self.identifier.clone()];
        names.extend(
            self.partitioning
                .partitions()
                .iter()
                .map(|p| self.partition_table_name(p)),
        );
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListPartition, RangePartition};

    fn people() -> Table {
        Table::new(DbObjectName::new("public", "people").unwrap())
            .with_column(TableColumn::new("id", "uuid").as_primary_key())
            .with_column(TableColumn::new("name", "varchar"))
            .with_column(TableColumn::new("role", "varchar").not_null())
    }

    #[test]
    fn test_primary_key_defaults() {
        let table = people();
        assert_eq!(table.primary_key_columns(), vec!["id"]);
        assert_eq!(table.primary_key_name(), "pkey_people_id");

        let named = people().with_primary_key_name("pk_people");
        assert_eq!(named.primary_key_name(), "pk_people");
    }

    #[test]
    fn test_column_lookup_ignores_case() {
        let table = people();
        assert!(table.has_column("NAME"));
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_partition_conflicts() {
        let ok = Table::new(DbObjectName::new("public", "people").unwrap())
            .with_column(TableColumn::new("id", "uuid").as_primary_key())
            .with_column(TableColumn::new("role", "varchar").as_primary_key())
            .partitioned_by(Partitioning::list(
                &["role"],
                vec![ListPartition::new("admin", vec!["'admin'".into()])],
            ));
        assert!(ok.partition_conflicts().is_empty());

        let missing_column = people().partitioned_by(Partitioning::hash(&["tenant"], &["a", "b"]));
        assert_eq!(missing_column.partition_conflicts().len(), 1);

        let outside_pk = people().partitioned_by(Partitioning::hash(&["role"], &["a", "b"]));
        assert!(outside_pk.partition_conflicts()[0].contains("does not contain"));
    }

    #[test]
    fn test_all_names_include_partitions() {
        let table = people().partitioned_by(Partitioning::range(
            &["id"],
            vec![
                RangePartition::new("low", "'0'", "'8'"),
                RangePartition::new("high", "'8'", "'g'"),
            ],
        ));
        let names: Vec<_> = table.all_names().iter().map(|n| n.qualified_name()).collect();
        assert_eq!(names, vec!["public.people", "public.people_low", "public.people_high"]);
    }

    #[test]
    fn test_shadow_copy() {
        let table = people().with_index(IndexDefinition::for_columns("people", &["name"]));
        let shadow = table.shadow_copy(table.identifier.with_suffix("rebuild"), false);
        assert!(shadow.primary_key_columns().is_empty());
        assert!(shadow.indexes.is_empty());
        assert_eq!(shadow.columns.len(), 3);
        assert_eq!(shadow.identifier.name, "people_rebuild");

        let kept = table.shadow_copy(table.identifier.with_suffix("rebuild"), true);
        assert_eq!(kept.primary_key_columns(), vec!["id"]);
        assert_eq!(kept.primary_key_name(), "pkey_people_id");
        assert!(kept.indexes.is_empty());
    }
}
