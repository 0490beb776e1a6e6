//! Migrations: every delta of one reconciliation attempt, gated by policy.

mod file;
mod policy;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::delta::{Difference, ObjectDelta};
use crate::error::{Error, RejectedDelta, Result};
use crate::model::SchemaObject;
use crate::probe::ProbeResult;
use crate::provider::{Fragment, Provider};
use crate::writer::DdlWriter;

pub use file::rollback_file_path;
pub use policy::AutoCreate;

/// The deltas of a set of objects against one probe snapshot.
#[derive(Debug, Clone, Default)]
pub struct SchemaMigration {
    deltas: Vec<ObjectDelta>,
    schemas: BTreeSet<String>,
}

impl SchemaMigration {
    /// Aggregate deltas, in application order.
    pub fn new(deltas: Vec<ObjectDelta>) -> Self {
        let schemas = deltas
            .iter()
            .map(|d| d.identifier().schema.clone())
            .collect();
        Self { deltas, schemas }
    }

    /// Compare every object with the probe result.
    pub fn determine(objects: &[Arc<dyn SchemaObject>], probe: &ProbeResult) -> Result<Self> {
        let deltas = objects
            .iter()
            .map(|object| object.create_delta(probe))
            .collect::<Result<Vec<_>>>()?;

        let migration = Self::new(deltas);
        debug!(
            objects = migration.deltas.len(),
            difference = %migration.difference(),
            "determined migration"
        );
        Ok(migration)
    }

    /// Deltas in application order.
    pub fn deltas(&self) -> &[ObjectDelta] {
        &self.deltas
    }

    /// Schemas referenced by the deltas.
    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(String::as_str)
    }

    /// Worst difference over all deltas; None when there are none.
    pub fn difference(&self) -> Difference {
        self.deltas
            .iter()
            .map(ObjectDelta::difference)
            .max()
            .unwrap_or(Difference::None)
    }

    /// Whether anything has to change.
    pub fn has_changes(&self) -> bool {
        self.difference() != Difference::None
    }

    /// Deltas the policy does not allow.
    pub fn rejected(&self, policy: AutoCreate) -> Vec<RejectedDelta> {
        self.deltas
            .iter()
            .filter(|d| !policy.allows(d.difference()))
            .map(|d| RejectedDelta {
                object: d.identifier().qualified_name(),
                difference: d.difference(),
            })
            .collect()
    }

    /// Reject the migration when any delta exceeds the policy.
    pub fn assert_patching_is_valid(&self, policy: AutoCreate) -> Result<()> {
        let deltas = self.rejected(policy);
        if deltas.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationFailed { policy, deltas })
        }
    }

    /// Forward DDL for every changed object, schemas first.
    pub fn write_all_updates(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        if !self.has_changes() {
            return;
        }
        for schema in &self.schemas {
            writer.write(provider.render(&Fragment::CreateSchema {
                schema: schema.as_str(),
            }));
        }
        for delta in &self.deltas {
            delta.write_update(provider, writer);
        }
    }

    /// Rollback DDL for every changed object, in reverse order.
    pub fn write_all_rollbacks(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        for delta in self.deltas.iter().rev() {
            delta.write_rollback(provider, writer);
        }
    }

    /// Forward DDL as a script.
    pub fn update_script(&self, provider: &dyn Provider) -> String {
        let mut writer = DdlWriter::new();
        self.write_all_updates(provider, &mut writer);
        writer.to_script(provider)
    }

    /// Rollback DDL as a script.
    pub fn rollback_script(&self, provider: &dyn Provider) -> String {
        let mut writer = DdlWriter::new();
        self.write_all_rollbacks(provider, &mut writer);
        writer.to_script(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::Delta;
    use crate::model::{DbObjectName, ListPartition, Partitioning, Sequence, Table, TableColumn};
    use crate::probe::ActualObject;
    use crate::provider::PostgresProvider;

    fn table(name: &str) -> Table {
        Table::new(DbObjectName::new("sales", name).unwrap())
            .with_column(TableColumn::new("id", "uuid").as_primary_key())
            .with_column(TableColumn::new("role", "varchar"))
    }

    fn probe(objects: Vec<ActualObject>) -> ProbeResult {
        ProbeResult::new(PostgresProvider::new().capabilities(), objects)
    }

    fn invalid_table() -> Table {
        table("people").partitioned_by(Partitioning::list(
            &["role"],
            vec![ListPartition::new("admin", vec!["'admin'".into()])],
        ))
    }

    #[test]
    fn test_empty_migration_is_none() {
        let migration = SchemaMigration::new(Vec::new());
        assert_eq!(migration.difference(), Difference::None);
        assert!(migration.assert_patching_is_valid(AutoCreate::CreateOnly).is_ok());
    }

    #[test]
    fn test_difference_is_worst_delta() {
        let existing = table("orders");
        let objects: Vec<Arc<dyn SchemaObject>> = vec![
            Arc::new(existing.clone()),
            Arc::new(table("people")),
            Arc::new(Sequence::new(DbObjectName::new("sales", "numbers").unwrap())),
        ];
        let migration =
            SchemaMigration::determine(&objects, &probe(vec![ActualObject::Table(existing)])).unwrap();

        assert_eq!(migration.deltas().len(), 3);
        assert_eq!(migration.difference(), Difference::Create);
        assert_eq!(migration.schemas().collect::<Vec<_>>(), vec!["sales"]);
    }

    #[test]
    fn test_policy_gate() {
        let objects: Vec<Arc<dyn SchemaObject>> = vec![Arc::new(invalid_table()), Arc::new(table("orders"))];
        let live = probe(vec![ActualObject::Table(table("people"))]);
        let migration = SchemaMigration::determine(&objects, &live).unwrap();
        assert_eq!(migration.difference(), Difference::Invalid);

        assert!(migration.assert_patching_is_valid(AutoCreate::All).is_ok());
        assert!(migration.assert_patching_is_valid(AutoCreate::None).is_ok());

        match migration.assert_patching_is_valid(AutoCreate::CreateOrUpdate) {
            Err(Error::ValidationFailed { policy, deltas }) => {
                assert_eq!(policy, AutoCreate::CreateOrUpdate);
                assert_eq!(deltas.len(), 1);
                assert_eq!(deltas[0].object, "sales.people");
                assert_eq!(deltas[0].difference, Difference::Invalid);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }

        let err = migration.assert_patching_is_valid(AutoCreate::CreateOnly).unwrap_err();
        assert!(err.to_string().contains("CreateOnly"));
        assert!(err.to_string().contains("sales.people (Invalid)"));
    }

    #[test]
    fn test_create_only_rejects_updates() {
        let expected = table("people").with_column(TableColumn::new("email", "varchar"));
        let delta = expected
            .create_delta(&probe(vec![ActualObject::Table(table("people"))]))
            .unwrap();
        let migration = SchemaMigration::new(vec![delta]);
        assert_eq!(migration.difference(), Difference::Update);
        assert!(migration.assert_patching_is_valid(AutoCreate::CreateOnly).is_err());
        assert!(migration.assert_patching_is_valid(AutoCreate::CreateOrUpdate).is_ok());
    }

    #[test]
    fn test_scripts() {
        let provider = PostgresProvider::new();
        let sequence = Sequence::new(DbObjectName::new("sales", "numbers").unwrap());
        let migration = SchemaMigration::new(vec![
            ObjectDelta::Table(crate::delta::TableDelta::compute(&table("people"), None, provider.capabilities())),
            ObjectDelta::Sequence(Delta::new(sequence, None)),
        ]);

        let update = migration.update_script(&provider);
        let lines: Vec<&str> = update.lines().collect();
        assert_eq!(lines[0], "CREATE SCHEMA IF NOT EXISTS \"sales\";");
        assert!(update.contains("CREATE SEQUENCE IF NOT EXISTS \"sales\".\"numbers\";"));

        let rollback = migration.rollback_script(&provider);
        let lines: Vec<&str> = rollback.lines().collect();
        assert_eq!(
            lines,
            vec![
                "DROP SEQUENCE IF EXISTS \"sales\".\"numbers\";",
                "DROP TABLE IF EXISTS \"sales\".\"people\" CASCADE;",
            ]
        );
    }

    #[test]
    fn test_no_changes_writes_nothing() {
        let existing = table("people");
        let objects: Vec<Arc<dyn SchemaObject>> = vec![Arc::new(existing.clone())];
        let migration =
            SchemaMigration::determine(&objects, &probe(vec![ActualObject::Table(existing)])).unwrap();
        assert!(!migration.has_changes());
        assert!(migration.update_script(&PostgresProvider::new()).is_empty());
    }
}
