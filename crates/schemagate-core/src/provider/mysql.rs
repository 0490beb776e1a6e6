//! MySQL and MariaDB.

use super::standard::{self, quote_list};
use super::{check_constraint_name, Capabilities, EngineKind, Fragment, Provider};
use crate::model::{DbObjectName, Partitioning, Table, TableColumn, TablePartition};

/// MySQL provider. Partitions are declared inline in CREATE TABLE.
#[derive(Debug, Clone)]
pub struct MySqlProvider {
    default_schema: String,
}

impl MySqlProvider {
    /// Provider with `public` as the default schema (database).
    pub fn new() -> Self {
        Self {
            default_schema: "public".to_string(),
        }
    }

    /// Use another default schema (database).
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    fn modify_column(&self, table: &DbObjectName, column: &TableColumn) -> String {
        format!(
            "ALTER TABLE {} MODIFY COLUMN {}",
            self.qualify(table),
            self.column_definition(table, column)
        )
    }

    fn partition_definition(&self, partition: &TablePartition) -> String {
        let name = self.quote(partition.suffix());
        match partition {
            TablePartition::Hash { .. } => format!("PARTITION {}", name),
            TablePartition::List(list) => {
                format!("PARTITION {} VALUES IN ({})", name, list.values.join(", "))
            }
            TablePartition::Range(range) => {
                format!("PARTITION {} VALUES LESS THAN ({})", name, range.to)
            }
            TablePartition::Default => format!("PARTITION {} DEFAULT", name),
        }
    }
}

impl Default for MySqlProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for MySqlProvider {
    fn kind(&self) -> EngineKind {
        EngineKind::MySql
    }

    fn default_schema(&self) -> &str {
        &self.default_schema
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            partitioning: true,
            inline_partitions: true,
            alter_column_type: true,
            alter_constraints: true,
            schemas: true,
            create_or_replace_function: false,
            sequences: false,
        }
    }

    fn quote(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn map_type(&self, generic: &str) -> String {
        match generic.to_lowercase().as_str() {
            "string" | "text" => "varchar(255)",
            "uuid" | "guid" => "char(36)",
            "json" => "json",
            "int" | "i32" => "int",
            "long" | "i64" => "bigint",
            "short" | "i16" => "smallint",
            "bool" | "boolean" => "tinyint(1)",
            "datetime" | "timestamp" => "datetime(6)",
            "date" => "date",
            "decimal" => "decimal(18,4)",
            "double" | "f64" => "double",
            "float" | "f32" => "float",
            "bytes" => "longblob",
            other => return other.to_string(),
        }
        .to_string()
    }

    fn partition_clause(&self, table: &Table) -> String {
        let partitions = table.partitioning.partitions();
        let strategy = match &table.partitioning {
            Partitioning::None => return String::new(),
            Partitioning::Hash(_) => {
                return format!(
                    " PARTITION BY HASH ({}) PARTITIONS {}",
                    quote_list(self, table.partitioning.columns()),
                    partitions.len()
                )
            }
            Partitioning::List(_) => "LIST COLUMNS",
            Partitioning::Range(_) => "RANGE COLUMNS",
        };
        format!(
            " PARTITION BY {} ({}) (\n    {}\n)",
            strategy,
            quote_list(self, table.partitioning.columns()),
            partitions
                .iter()
                .map(|p| self.partition_definition(p))
                .collect::<Vec<_>>()
                .join(",\n    ")
        )
    }

    fn render(&self, fragment: &Fragment<'_>) -> String {
        match *fragment {
            Fragment::RenameTable { from, to } => format!(
                "RENAME TABLE {} TO {}",
                self.qualify(from),
                self.qualify(&from.with_name(to))
            ),
            Fragment::AlterColumnType { table, column }
            | Fragment::SetNullability { table, column } => self.modify_column(table, column),
            Fragment::DropCheck { table, column } => format!(
                "ALTER TABLE {} DROP CHECK {}",
                self.qualify(table),
                self.quote(&check_constraint_name(table, column))
            ),
            Fragment::DropPrimaryKey { table, .. } => {
                format!("ALTER TABLE {} DROP PRIMARY KEY", self.qualify(table))
            }
            Fragment::AddPrimaryKey { table, columns, .. } => format!(
                "ALTER TABLE {} ADD PRIMARY KEY ({})",
                self.qualify(table),
                quote_list(self, columns)
            ),
            Fragment::DropIndex { table, index } => format!(
                "DROP INDEX {} ON {}",
                self.quote(&index.name),
                self.qualify(table)
            ),
            Fragment::DropForeignKey { table, name } => format!(
                "ALTER TABLE {} DROP FOREIGN KEY {}",
                self.qualify(table),
                self.quote(name)
            ),
            Fragment::CreatePartition { table, partition } => match partition {
                TablePartition::Hash { .. } => String::new(),
                _ => format!(
                    "ALTER TABLE {} ADD PARTITION ({})",
                    self.qualify(&table.identifier),
                    self.partition_definition(partition)
                ),
            },
            Fragment::DropPartition { table, partition } => format!(
                "ALTER TABLE {} DROP PARTITION {}",
                self.qualify(&table.identifier),
                self.quote(partition.suffix())
            ),
            Fragment::DropFunction { function } => format!(
                "DROP FUNCTION IF EXISTS {}",
                self.qualify(&function.identifier)
            ),
            Fragment::CreateView { view } => format!(
                "CREATE OR REPLACE VIEW {} AS {}",
                self.qualify(&view.identifier),
                view.sql.trim_end_matches(';')
            ),
            _ => standard::render(self, fragment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListPartition, SchemaObject};
    use crate::writer::DdlWriter;

    fn roles() -> Table {
        Table::new(DbObjectName::new("app", "people").unwrap())
            .with_column(TableColumn::new("id", "char(36)").as_primary_key())
            .with_column(TableColumn::new("role", "varchar(20)").as_primary_key())
            .partitioned_by(Partitioning::list(
                &["role"],
                vec![
                    ListPartition::new("admin", vec!["'admin'".into()]),
                    ListPartition::new("super", vec!["'super'".into()]),
                ],
            ))
    }

    #[test]
    fn test_inline_partitions() {
        let provider = MySqlProvider::new();
        let table = roles();
        let mut writer = DdlWriter::new();
        table.write_create(&provider, &mut writer);

        assert_eq!(writer.executable_count(), 1);
        let script = writer.to_script(&provider);
        assert!(script.contains("PARTITION BY LIST COLUMNS (`role`)"));
        assert!(script.contains("PARTITION `super` VALUES IN ('super')"));
    }

    #[test]
    fn test_add_partition() {
        let provider = MySqlProvider::new();
        let table = roles();
        let partition = TablePartition::List(ListPartition::new("special", vec!["'special'".into()]));
        let sql = provider.render(&Fragment::CreatePartition {
            table: &table,
            partition: &partition,
        });
        assert_eq!(
            sql,
            "ALTER TABLE `app`.`people` ADD PARTITION (PARTITION `special` VALUES IN ('special'))"
        );
    }

    #[test]
    fn test_modify_column() {
        let provider = MySqlProvider::new();
        let column = TableColumn::new("name", "varchar(100)").not_null().with_default("''");
        let sql = provider.render(&Fragment::SetNullability {
            table: &DbObjectName::new("app", "people").unwrap(),
            column: &column,
        });
        assert_eq!(sql, "ALTER TABLE `app`.`people` MODIFY COLUMN `name` varchar(100) NOT NULL DEFAULT ''");
    }

    #[test]
    fn test_sequences_are_not_rendered() {
        let provider = MySqlProvider::new();
        let sequence = crate::model::Sequence::new(DbObjectName::new("app", "numbers").unwrap());
        let mut writer = DdlWriter::new();
        sequence.write_create(&provider, &mut writer);
        assert!(writer.is_empty());
    }
}
