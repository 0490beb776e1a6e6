//! Table comparison and DDL.

use tracing::debug;

use super::items::ItemSetDelta;
use super::partition::PartitionDelta;
use super::Difference;
use crate::model::{
    same_name, same_names, DbObjectName, ForeignKey, IndexDefinition, SchemaObject, Table,
    TableColumn,
};
use crate::provider::{Capabilities, Fragment, Provider};
use crate::writer::{CopyRows, DdlWriter};

/// Comparison of a declared table with the live one.
#[derive(Debug, Clone)]
pub struct TableDelta {
    /// Declared table.
    pub expected: Table,
    /// Live table, if it exists.
    pub actual: Option<Table>,
    /// Column comparison.
    pub columns: ItemSetDelta<TableColumn>,
    /// Index comparison.
    pub indexes: ItemSetDelta<IndexDefinition>,
    /// Foreign key comparison.
    pub foreign_keys: ItemSetDelta<ForeignKey>,
    /// Primary key comparison.
    pub primary_key_difference: Difference,
    /// Partitioning comparison.
    pub partition_delta: PartitionDelta,
    rebuild: bool,
    conflicts: Vec<String>,
    difference: Difference,
}

impl TableDelta {
    /// Compare `expected` with `actual` for an engine with `capabilities`.
    pub fn compute(expected: &Table, actual: Option<&Table>, capabilities: Capabilities) -> Self {
        let columns = ItemSetDelta::compute(&expected.columns, live_columns(actual));
        let indexes = ItemSetDelta::compute(&expected.indexes, live_indexes(actual));
        let foreign_keys = ItemSetDelta::compute(&expected.foreign_keys, live_foreign_keys(actual));

        let Some(actual) = actual else {
            return Self {
                expected: expected.clone(),
                actual: None,
                columns,
                indexes,
                foreign_keys,
                primary_key_difference: Difference::Create,
                partition_delta: PartitionDelta::None,
                rebuild: false,
                conflicts: Vec::new(),
                difference: Difference::Create,
            };
        };

        let primary_key_difference = primary_key_difference(expected, actual);
        let partition_delta = PartitionDelta::compute(&expected.partitioning, &actual.partitioning);

        let constraint_rebuild = !capabilities.alter_constraints
            && (primary_key_difference != Difference::None
                || foreign_keys.has_changes()
                || !columns.different.is_empty()
                || columns
                    .missing
                    .iter()
                    .any(|c| c.check.is_some() || (!c.nullable && c.default.is_none())));
        let rebuild = partition_delta == PartitionDelta::Rebuild || constraint_rebuild;

        let conflicts = if rebuild || primary_key_difference != Difference::None {
            expected.partition_conflicts()
        } else {
            Vec::new()
        };

        let difference = if !conflicts.is_empty() {
            Difference::Invalid
        } else if columns.has_changes()
            || indexes.has_changes()
            || foreign_keys.has_changes()
            || primary_key_difference != Difference::None
            || partition_delta.has_changes()
        {
            Difference::Update
        } else {
            Difference::None
        };

        debug!(
            table = %expected.identifier,
            %difference,
            rebuild,
            missing_columns = columns.missing.len(),
            extra_columns = columns.extras.len(),
            "computed table delta"
        );

        Self {
            expected: expected.clone(),
            actual: Some(actual.clone()),
            columns,
            indexes,
            foreign_keys,
            primary_key_difference,
            partition_delta,
            rebuild,
            conflicts,
            difference,
        }
    }

    /// Severity of the difference.
    pub fn difference(&self) -> Difference {
        self.difference
    }

    /// Whether the update goes through a shadow-table rebuild.
    pub fn requires_rebuild(&self) -> bool {
        self.rebuild && self.difference == Difference::Update
    }

    /// Why the table cannot be altered in place, when Invalid.
    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    /// Forward DDL. Invalid tables are dropped and recreated; only the
    /// `All` policy lets that through.
    pub fn write_update(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        let Some(actual) = &self.actual else {
            if self.difference == Difference::Create {
                self.expected.write_create(provider, writer);
            }
            return;
        };

        match self.difference {
            Difference::None | Difference::Create => {}
            Difference::Invalid => {
                writer.write_comment(format!(
                    "{} cannot be altered in place ({}), recreating",
                    self.expected.identifier,
                    self.conflicts.join("; ")
                ));
                actual.write_drop(provider, writer);
                self.expected.write_create(provider, writer);
            }
            Difference::Update if self.rebuild => {
                write_rebuild(provider, writer, &self.expected, actual, &self.columns.extras);
            }
            Difference::Update => self.write_alterations(provider, writer, actual),
        }
    }

    /// Inverse of [`TableDelta::write_update`].
    pub fn write_rollback(&self, provider: &dyn Provider, writer: &mut DdlWriter) {
        let Some(actual) = &self.actual else {
            if self.difference == Difference::Create {
                self.expected.write_drop(provider, writer);
            }
            return;
        };

        match self.difference {
            Difference::None | Difference::Create => {}
            Difference::Invalid => {
                self.expected.write_drop(provider, writer);
                actual.write_create(provider, writer);
            }
            Difference::Update if self.rebuild => {
                let applied = self.applied_layout();
                write_rebuild(provider, writer, actual, &applied, &[]);
            }
            Difference::Update => self.write_reversal(provider, writer, actual),
        }
    }

    /// The live layout after the forward DDL ran: the declared table plus
    /// undeclared columns, which are never dropped.
    fn applied_layout(&self) -> Table {
        let mut applied = self.expected.clone();
        applied.columns.extend(self.columns.extras.iter().cloned());
        applied
    }

    fn write_alterations(&self, provider: &dyn Provider, writer: &mut DdlWriter, actual: &Table) {
        let expected = &self.expected;
        let table = &expected.identifier;
        let caps = provider.capabilities();
        let primary_key_changed = self.primary_key_difference != Difference::None;

        if primary_key_changed {
            write_drop_primary_key(provider, writer, actual);
        }
        for foreign_key in self.foreign_keys.to_remove() {
            writer.write(provider.render(&Fragment::DropForeignKey {
                table,
                name: &foreign_key.name,
            }));
        }
        for index in self.indexes.to_remove() {
            writer.write(provider.render(&Fragment::DropIndex { table, index }));
        }

        for column in &self.columns.missing {
            write_add_column(provider, writer, table, column);
        }
        for change in &self.columns.different {
            write_alter_column(provider, writer, table, &change.actual, &change.expected, caps);
        }

        if primary_key_changed {
            write_add_primary_key(provider, writer, expected);
        }
        for index in self.indexes.to_create() {
            writer.write(provider.render(&Fragment::CreateIndex { table, index }));
        }
        for foreign_key in self.foreign_keys.to_create() {
            writer.write(provider.render(&Fragment::AddForeignKey { table, foreign_key }));
        }

        if let PartitionDelta::Additive(partitions) = &self.partition_delta {
            for partition in partitions {
                writer.write(provider.render(&Fragment::CreatePartition {
                    table: expected,
                    partition,
                }));
            }
        }
    }

    fn write_reversal(&self, provider: &dyn Provider, writer: &mut DdlWriter, actual: &Table) {
        let expected = &self.expected;
        let table = &expected.identifier;
        let caps = provider.capabilities();
        let primary_key_changed = self.primary_key_difference != Difference::None;

        if primary_key_changed {
            write_drop_primary_key(provider, writer, expected);
        }
        for foreign_key in self.foreign_keys.to_create() {
            writer.write(provider.render(&Fragment::DropForeignKey {
                table,
                name: &foreign_key.name,
            }));
        }
        for index in self.indexes.to_create() {
            writer.write(provider.render(&Fragment::DropIndex { table, index }));
        }

        if let PartitionDelta::Additive(partitions) = &self.partition_delta {
            for partition in partitions {
                writer.write(provider.render(&Fragment::DropPartition {
                    table: expected,
                    partition,
                }));
            }
        }

        for column in &self.columns.missing {
            writer.write(provider.render(&Fragment::DropColumn {
                table,
                column: &column.name,
            }));
        }
        for change in &self.columns.different {
            write_alter_column(provider, writer, table, &change.expected, &change.actual, caps);
        }

        if primary_key_changed {
            write_add_primary_key(provider, writer, actual);
        }
        for index in self.indexes.to_remove() {
            writer.write(provider.render(&Fragment::CreateIndex { table, index }));
        }
        for foreign_key in self.foreign_keys.to_remove() {
            writer.write(provider.render(&Fragment::AddForeignKey { table, foreign_key }));
        }
    }
}

fn live_columns(actual: Option<&Table>) -> &[TableColumn] {
    actual.map(|t| t.columns.as_slice()).unwrap_or(&[])
}

fn live_indexes(actual: Option<&Table>) -> &[IndexDefinition] {
    actual.map(|t| t.indexes.as_slice()).unwrap_or(&[])
}

fn live_foreign_keys(actual: Option<&Table>) -> &[ForeignKey] {
    actual.map(|t| t.foreign_keys.as_slice()).unwrap_or(&[])
}

fn primary_key_difference(expected: &Table, actual: &Table) -> Difference {
    let expected_columns = expected.primary_key_columns();
    let actual_columns = actual.primary_key_columns();

    match (expected_columns.is_empty(), actual_columns.is_empty()) {
        (true, true) => Difference::None,
        (false, true) => Difference::Create,
        _ if same_names(&expected_columns, &actual_columns)
            && same_name(&expected.primary_key_name(), &actual.primary_key_name()) =>
        {
            Difference::None
        }
        _ => Difference::Update,
    }
}

fn write_drop_primary_key(provider: &dyn Provider, writer: &mut DdlWriter, table: &Table) {
    if !table.primary_key_columns().is_empty() {
        writer.write(provider.render(&Fragment::DropPrimaryKey {
            table: &table.identifier,
            name: &table.primary_key_name(),
        }));
    }
}

fn write_add_primary_key(provider: &dyn Provider, writer: &mut DdlWriter, table: &Table) {
    let columns = table.primary_key_columns();
    if !columns.is_empty() {
        writer.write(provider.render(&Fragment::AddPrimaryKey {
            table: &table.identifier,
            name: &table.primary_key_name(),
            columns: &columns,
        }));
    }
}

fn write_add_column(
    provider: &dyn Provider,
    writer: &mut DdlWriter,
    table: &DbObjectName,
    column: &TableColumn,
) {
    writer.write(provider.render(&Fragment::AddColumn { table, column }));
    if column.check.is_some() {
        writer.write(provider.render(&Fragment::AddCheck { table, column }));
    }
}

/// Alter `from` into `to`. Engines that cannot change a type in place get a
/// drop and re-add of the column.
fn write_alter_column(
    provider: &dyn Provider,
    writer: &mut DdlWriter,
    table: &DbObjectName,
    from: &TableColumn,
    to: &TableColumn,
    caps: Capabilities,
) {
    let type_changed = !from.type_matches(to);

    if type_changed && !caps.alter_column_type {
        writer.write(provider.render(&Fragment::DropColumn {
            table,
            column: &from.name,
        }));
        write_add_column(provider, writer, table, to);
        return;
    }

    if type_changed {
        writer.write(provider.render(&Fragment::AlterColumnType { table, column: to }));
    }
    if from.nullable != to.nullable {
        writer.write(provider.render(&Fragment::SetNullability { table, column: to }));
    }
    if !from.default_matches(to) {
        let fragment = match to.default {
            Some(_) => Fragment::SetDefault { table, column: to },
            None => Fragment::DropDefault { table, column: to },
        };
        writer.write(provider.render(&fragment));
    }
    if !from.check_matches(to) {
        if from.check.is_some() {
            writer.write(provider.render(&Fragment::DropCheck {
                table,
                column: &from.name,
            }));
        }
        if to.check.is_some() {
            writer.write(provider.render(&Fragment::AddCheck { table, column: to }));
        }
    }
}

/// Move `source` onto the `target` layout through a shadow table:
/// create `<name>_rebuild`, copy rows, rename the live table to
/// `<name>_retired`, rename the shadow into place, drop the retired table,
/// rename shadow partitions, then restore keys and indexes.
fn write_rebuild(
    provider: &dyn Provider,
    writer: &mut DdlWriter,
    target: &Table,
    source: &Table,
    retained: &[TableColumn],
) {
    let caps = provider.capabilities();
    let inline_constraints = !caps.alter_constraints;

    let mut shadow = target.shadow_copy(target.identifier.with_suffix("rebuild"), inline_constraints);
    shadow.columns.extend(retained.iter().cloned().map(|mut c| {
        c.primary_key = false;
        c
    }));

    writer.write_comment(format!("rebuild {} with a new layout", target.identifier));
    shadow.write_create_table(provider, writer);

    let columns: Vec<String> = shadow
        .columns
        .iter()
        .filter(|c| source.has_column(&c.name))
        .map(|c| c.name.clone())
        .collect();
    let mut order_by = source.primary_key_columns();
    if order_by.is_empty() {
        order_by = columns.clone();
    }
    writer.write_copy(CopyRows {
        source: source.identifier.clone(),
        target: shadow.identifier.clone(),
        columns,
        order_by,
    });

    let retired = source.identifier.with_suffix("retired");
    writer.write(provider.render(&Fragment::RenameTable {
        from: &source.identifier,
        to: &retired.name,
    }));
    writer.write(provider.render(&Fragment::RenameTable {
        from: &shadow.identifier,
        to: &target.identifier.name,
    }));
    writer.write(provider.render(&Fragment::DropTable { name: &retired }));

    if caps.partitioning && !caps.inline_partitions {
        for partition in target.partitioning.partitions() {
            let from = shadow.partition_table_name(&partition);
            let to = target.partition_table_name(&partition);
            writer.write(provider.render(&Fragment::RenameTable {
                from: &from,
                to: &to.name,
            }));
        }
    }

    if !inline_constraints {
        write_add_primary_key(provider, writer, target);
    }
    target.write_indexes(provider, writer);
    if !inline_constraints {
        target.write_foreign_keys(provider, writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListPartition, Partitioning, RangePartition};
    use crate::provider::{PostgresProvider, SqliteProvider};
    use crate::writer::DdlStatement;

    fn people() -> Table {
        Table::new(DbObjectName::new("public", "people").unwrap())
            .with_column(TableColumn::new("id", "uuid").as_primary_key())
            .with_column(TableColumn::new("name", "varchar"))
    }

    fn caps() -> Capabilities {
        PostgresProvider::new().capabilities()
    }

    fn statements(writer: &DdlWriter) -> Vec<String> {
        let provider = PostgresProvider::new();
        writer
            .statements()
            .iter()
            .filter(|s| s.is_executable())
            .map(|s| s.render(&provider))
            .collect()
    }

    #[test]
    fn test_identical_table() {
        let table = people();
        let delta = TableDelta::compute(&table, Some(&table), caps());
        assert_eq!(delta.difference(), Difference::None);

        let mut writer = DdlWriter::new();
        delta.write_update(&PostgresProvider::new(), &mut writer);
        assert!(writer.is_empty());
    }

    #[test]
    fn test_missing_table_is_created() {
        let delta = TableDelta::compute(&people(), None, caps());
        assert_eq!(delta.difference(), Difference::Create);

        let mut writer = DdlWriter::new();
        delta.write_update(&PostgresProvider::new(), &mut writer);
        assert!(statements(&writer)[0].starts_with("CREATE TABLE \"public\".\"people\""));
    }

    #[test]
    fn test_undeclared_column_is_reported_not_dropped() {
        let actual = people().with_column(TableColumn::new("email", "varchar"));
        let delta = TableDelta::compute(&people(), Some(&actual), caps());

        assert_eq!(delta.difference(), Difference::Update);
        assert_eq!(delta.columns.extras.len(), 1);
        assert_eq!(delta.columns.extras[0].name, "email");

        let mut writer = DdlWriter::new();
        delta.write_update(&PostgresProvider::new(), &mut writer);
        assert!(writer.is_empty());
    }

    #[test]
    fn test_adding_range_partitioning_rebuilds() {
        let actual = people().with_column(TableColumn::new("created", "date"));
        let expected = Table::new(DbObjectName::new("public", "people").unwrap())
            .with_column(TableColumn::new("id", "uuid").as_primary_key())
            .with_column(TableColumn::new("name", "varchar"))
            .with_column(TableColumn::new("created", "date").as_primary_key())
            .with_primary_key_name("pkey_people_id")
            .partitioned_by(Partitioning::range(
                &["created"],
                vec![RangePartition::new("2024", "'2024-01-01'", "'2025-01-01'")],
            ));

        let delta = TableDelta::compute(&expected, Some(&actual), caps());
        assert_eq!(delta.partition_delta, PartitionDelta::Rebuild);
        assert_eq!(delta.difference(), Difference::Update);
        assert!(delta.requires_rebuild());

        let mut writer = DdlWriter::new();
        delta.write_update(&PostgresProvider::new(), &mut writer);
        let sql = statements(&writer);
        assert!(sql[0].starts_with("CREATE TABLE \"public\".\"people_rebuild\""));
        assert!(sql[0].ends_with("PARTITION BY RANGE (\"created\")"));
        assert!(sql[1].contains("PARTITION OF \"public\".\"people_rebuild\""));
        assert!(sql[2].starts_with("INSERT INTO \"public\".\"people_rebuild\""));
        assert_eq!(sql[3], "ALTER TABLE \"public\".\"people\" RENAME TO \"people_retired\"");
        assert_eq!(sql[4], "ALTER TABLE \"public\".\"people_rebuild\" RENAME TO \"people\"");
        assert_eq!(sql[5], "DROP TABLE IF EXISTS \"public\".\"people_retired\" CASCADE");
        assert_eq!(sql[6], "ALTER TABLE \"public\".\"people_rebuild_2024\" RENAME TO \"people_2024\"");
        assert!(sql[7].contains("PRIMARY KEY (\"id\", \"created\")"));
    }

    #[test]
    fn test_partition_outside_primary_key_is_invalid() {
        let expected = people()
            .with_column(TableColumn::new("role", "varchar"))
            .partitioned_by(Partitioning::list(
                &["role"],
                vec![ListPartition::new("admin", vec!["'admin'".into()])],
            ));
        let actual = people().with_column(TableColumn::new("role", "varchar"));

        let delta = TableDelta::compute(&expected, Some(&actual), caps());
        assert_eq!(delta.difference(), Difference::Invalid);
        assert_eq!(delta.conflicts().len(), 1);

        let mut writer = DdlWriter::new();
        delta.write_update(&PostgresProvider::new(), &mut writer);
        assert!(matches!(writer.statements()[0], DdlStatement::Comment(_)));
        assert!(statements(&writer)[0].starts_with("DROP TABLE"));
    }

    #[test]
    fn test_additive_partition() {
        let table = |names: &[&str]| {
            Table::new(DbObjectName::new("public", "people").unwrap())
                .with_column(TableColumn::new("id", "uuid").as_primary_key())
                .with_column(TableColumn::new("role", "varchar").as_primary_key())
                .partitioned_by(Partitioning::list(
                    &["role"],
                    names
                        .iter()
                        .map(|n| ListPartition::new(*n, vec![format!("'{}'", n)]))
                        .collect(),
                ))
        };
        let delta = TableDelta::compute(&table(&["admin", "special"]), Some(&table(&["admin"])), caps());
        assert_eq!(delta.difference(), Difference::Update);

        let provider = PostgresProvider::new();
        let mut forward = DdlWriter::new();
        delta.write_update(&provider, &mut forward);
        assert_eq!(
            statements(&forward),
            vec!["CREATE TABLE \"public\".\"people_special\" PARTITION OF \"public\".\"people\" FOR VALUES IN ('special')"]
        );

        let mut rollback = DdlWriter::new();
        delta.write_rollback(&provider, &mut rollback);
        assert_eq!(
            statements(&rollback),
            vec!["DROP TABLE IF EXISTS \"public\".\"people_special\""]
        );
    }

    #[test]
    fn test_alterations_and_their_reversal() {
        let actual = people()
            .with_column(TableColumn::new("age", "int4"))
            .with_index(IndexDefinition::for_columns("people", &["name"]));
        let expected = people()
            .with_column(TableColumn::new("age", "bigint").not_null().with_default("0"))
            .with_column(TableColumn::new("email", "varchar").with_check("email like '%@%'"))
            .with_index(IndexDefinition::for_columns("people", &["name"]).unique());

        let provider = PostgresProvider::new();
        let delta = TableDelta::compute(&expected, Some(&actual), provider.capabilities());
        assert_eq!(delta.difference(), Difference::Update);
        assert!(!delta.requires_rebuild());

        let mut forward = DdlWriter::new();
        delta.write_update(&provider, &mut forward);
        assert_eq!(
            statements(&forward),
            vec![
                "DROP INDEX IF EXISTS \"public\".\"idx_people_name\"",
                "ALTER TABLE \"public\".\"people\" ADD COLUMN \"email\" varchar",
                "ALTER TABLE \"public\".\"people\" ADD CONSTRAINT \"ck_people_email\" CHECK (email like '%@%')",
                "ALTER TABLE \"public\".\"people\" ALTER COLUMN \"age\" TYPE bigint USING \"age\"::bigint",
                "ALTER TABLE \"public\".\"people\" ALTER COLUMN \"age\" SET NOT NULL",
                "ALTER TABLE \"public\".\"people\" ALTER COLUMN \"age\" SET DEFAULT 0",
                "CREATE UNIQUE INDEX \"idx_people_name\" ON \"public\".\"people\" (\"name\")",
            ]
        );

        let mut rollback = DdlWriter::new();
        delta.write_rollback(&provider, &mut rollback);
        assert_eq!(
            statements(&rollback),
            vec![
                "DROP INDEX IF EXISTS \"public\".\"idx_people_name\"",
                "ALTER TABLE \"public\".\"people\" DROP COLUMN \"email\"",
                "ALTER TABLE \"public\".\"people\" ALTER COLUMN \"age\" TYPE int4 USING \"age\"::int4",
                "ALTER TABLE \"public\".\"people\" ALTER COLUMN \"age\" DROP NOT NULL",
                "ALTER TABLE \"public\".\"people\" ALTER COLUMN \"age\" DROP DEFAULT",
                "CREATE INDEX \"idx_people_name\" ON \"public\".\"people\" (\"name\")",
            ]
        );
    }

    #[test]
    fn test_primary_key_rename_recreates_constraint() {
        let expected = people().with_primary_key_name("pk_people");
        let delta = TableDelta::compute(&expected, Some(&people()), caps());
        assert_eq!(delta.primary_key_difference, Difference::Update);

        let mut writer = DdlWriter::new();
        delta.write_update(&PostgresProvider::new(), &mut writer);
        assert_eq!(
            statements(&writer),
            vec![
                "ALTER TABLE \"public\".\"people\" DROP CONSTRAINT \"pkey_people_id\"",
                "ALTER TABLE \"public\".\"people\" ADD CONSTRAINT \"pk_people\" PRIMARY KEY (\"id\")",
            ]
        );
    }

    #[test]
    fn test_sqlite_constraint_change_rebuilds() {
        let provider = SqliteProvider::new();
        let expected = Table::new(DbObjectName::new("main", "people").unwrap())
            .with_column(TableColumn::new("id", "integer").as_primary_key())
            .with_column(TableColumn::new("name", "text").not_null().with_default("''"));
        let actual = Table::new(DbObjectName::new("main", "people").unwrap())
            .with_column(TableColumn::new("id", "integer").as_primary_key())
            .with_column(TableColumn::new("name", "text"))
            .with_column(TableColumn::new("legacy", "text"));

        let delta = TableDelta::compute(&expected, Some(&actual), provider.capabilities());
        assert_eq!(delta.difference(), Difference::Update);
        assert!(delta.requires_rebuild());

        let mut writer = DdlWriter::new();
        delta.write_update(&provider, &mut writer);
        let sql: Vec<String> = writer
            .statements()
            .iter()
            .filter(|s| s.is_executable())
            .map(|s| s.render(&provider))
            .collect();

        assert!(sql[0].contains("CREATE TABLE \"people_rebuild\""));
        assert!(sql[0].contains("\"legacy\" text"));
        assert!(sql[0].contains("PRIMARY KEY (\"id\")"));
        assert_eq!(
            sql[1],
            "INSERT INTO \"people_rebuild\" (\"id\", \"name\", \"legacy\") SELECT \"id\", \"name\", \"legacy\" FROM \"people\""
        );
        assert_eq!(sql[2], "ALTER TABLE \"people\" RENAME TO \"people_retired\"");
        assert_eq!(sql[3], "ALTER TABLE \"people_rebuild\" RENAME TO \"people\"");
        assert_eq!(sql[4], "DROP TABLE IF EXISTS \"people_retired\"");
        assert_eq!(sql.len(), 5);
    }

    #[test]
    fn test_type_change_without_alter_support_drops_and_adds() {
        let mut caps = caps();
        caps.alter_column_type = false;
        let provider = PostgresProvider::new();
        let from = TableColumn::new("age", "varchar");
        let to = TableColumn::new("age", "integer");

        let mut writer = DdlWriter::new();
        write_alter_column(&provider, &mut writer, &people().identifier, &from, &to, caps);
        assert_eq!(
            statements(&writer),
            vec![
                "ALTER TABLE \"public\".\"people\" DROP COLUMN \"age\"",
                "ALTER TABLE \"public\".\"people\" ADD COLUMN \"age\" integer",
            ]
        );
    }
}
