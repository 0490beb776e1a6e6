//! PostgreSQL.

use super::standard::{self, quote_list};
use super::{literal, Capabilities, EngineKind, Fragment, Provider};
use crate::model::{DbObjectName, ObjectKind, Table, TablePartition};

/// PostgreSQL provider.
#[derive(Debug, Clone)]
pub struct PostgresProvider {
    default_schema: String,
}

impl PostgresProvider {
    /// Provider with `public` as the default schema.
    pub fn new() -> Self {
        Self {
            default_schema: "public".to_string(),
        }
    }

    /// Use another default schema.
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    fn partition_bounds(&self, partition: &TablePartition) -> String {
        match partition {
            TablePartition::Hash {
                modulus, remainder, ..
            } => format!("FOR VALUES WITH (MODULUS {}, REMAINDER {})", modulus, remainder),
            TablePartition::List(list) => format!("FOR VALUES IN ({})", list.values.join(", ")),
            TablePartition::Range(range) => {
                format!("FOR VALUES FROM ({}) TO ({})", range.from, range.to)
            }
            TablePartition::Default => "DEFAULT".to_string(),
        }
    }
}

impl Default for PostgresProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for PostgresProvider {
    fn kind(&self) -> EngineKind {
        EngineKind::Postgres
    }

    fn default_schema(&self) -> &str {
        &self.default_schema
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            partitioning: true,
            inline_partitions: false,
            alter_column_type: true,
            alter_constraints: true,
            schemas: true,
            create_or_replace_function: true,
            sequences: true,
        }
    }

    fn map_type(&self, generic: &str) -> String {
        match generic.to_lowercase().as_str() {
            "string" | "text" => "varchar",
            "uuid" | "guid" => "uuid",
            "json" => "jsonb",
            "int" | "i32" => "integer",
            "long" | "i64" => "bigint",
            "short" | "i16" => "smallint",
            "bool" | "boolean" => "boolean",
            "datetime" | "timestamp" => "timestamp with time zone",
            "date" => "date",
            "decimal" => "numeric",
            "double" | "f64" => "double precision",
            "float" | "f32" => "real",
            "bytes" => "bytea",
            other => return other.to_string(),
        }
        .to_string()
    }

    fn probe_sql(&self, kind: ObjectKind, name: &DbObjectName) -> String {
        let schema = literal(&name.schema);
        let object = literal(&name.name);
        match kind {
            ObjectKind::Function => format!(
                "SELECT pg_get_functiondef(p.oid) FROM pg_proc p \
                 JOIN pg_namespace n ON n.oid = p.pronamespace \
                 WHERE n.nspname = {} AND p.proname = {}",
                schema, object
            ),
            ObjectKind::View => format!(
                "SELECT pg_get_viewdef(c.oid) FROM pg_class c \
                 JOIN pg_namespace n ON n.oid = c.relnamespace \
                 WHERE c.relkind = 'v' AND n.nspname = {} AND c.relname = {}",
                schema, object
            ),
            ObjectKind::Table => format!(
                "{};\n\
                 SELECT i.relname, pg_get_indexdef(i.oid) FROM pg_index x \
                 JOIN pg_class i ON i.oid = x.indexrelid JOIN pg_class t ON t.oid = x.indrelid \
                 JOIN pg_namespace n ON n.oid = t.relnamespace \
                 WHERE n.nspname = {} AND t.relname = {} AND NOT x.indisprimary;\n\
                 SELECT conname, pg_get_constraintdef(c.oid) FROM pg_constraint c \
                 JOIN pg_class t ON t.oid = c.conrelid JOIN pg_namespace n ON n.oid = t.relnamespace \
                 WHERE n.nspname = {} AND t.relname = {} AND c.contype IN ('p', 'f', 'c');\n\
                 SELECT pg_get_partkeydef(t.oid) FROM pg_class t \
                 JOIN pg_namespace n ON n.oid = t.relnamespace \
                 WHERE n.nspname = {} AND t.relname = {}",
                standard::probe_sql(self, kind, name),
                schema,
                object,
                schema,
                object,
                schema,
                object
            ),
            ObjectKind::Sequence => standard::probe_sql(self, kind, name),
        }
    }

    fn partition_clause(&self, table: &Table) -> String {
        if !table.partitioning.is_partitioned() {
            return String::new();
        }
        format!(
            " PARTITION BY {} ({})",
            table.partitioning.strategy().as_sql(),
            quote_list(self, table.partitioning.columns())
        )
    }

    fn render(&self, fragment: &Fragment<'_>) -> String {
        match *fragment {
            Fragment::DropTable { name } => {
                format!("DROP TABLE IF EXISTS {} CASCADE", self.qualify(name))
            }
            Fragment::AlterColumnType { table, column } => format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {}::{}",
                self.qualify(table),
                self.quote(&column.name),
                column.column_type,
                self.quote(&column.name),
                column.column_type
            ),
            Fragment::CreateIndex { table, index } => {
                let mut sql = format!(
                    "CREATE {}INDEX {} ON {}",
                    if index.unique { "UNIQUE " } else { "" },
                    self.quote(&index.name),
                    self.qualify(table)
                );
                if let Some(method) = &index.method {
                    sql.push_str(&format!(" USING {}", method));
                }
                sql.push_str(&format!(" ({})", standard::index_columns(self, index)));
                if let Some(fill_factor) = index.fill_factor {
                    sql.push_str(&format!(" WITH (fillfactor = {})", fill_factor));
                }
                if let Some(predicate) = &index.predicate {
                    sql.push_str(&format!(" WHERE {}", predicate));
                }
                sql
            }
            Fragment::CreatePartition { table, partition } => format!(
                "CREATE TABLE {} PARTITION OF {} {}",
                self.qualify(&table.partition_table_name(partition)),
                self.qualify(&table.identifier),
                self.partition_bounds(partition)
            ),
            Fragment::DropPartition { table, partition } => format!(
                "DROP TABLE IF EXISTS {}",
                self.qualify(&table.partition_table_name(partition))
            ),
            Fragment::CreateSequence { sequence } => {
                let mut sql = format!(
                    "CREATE SEQUENCE IF NOT EXISTS {}",
                    self.qualify(&sequence.identifier)
                );
                if let Some(start) = sequence.start_with {
                    sql.push_str(&format!(" START {}", start));
                }
                if let Some((table, column)) = &sequence.owner {
                    sql.push_str(&format!(
                        " OWNED BY {}.{}",
                        self.qualify(table),
                        self.quote(column)
                    ));
                }
                sql
            }
            Fragment::DropFunction { function } => format!(
                "DROP FUNCTION IF EXISTS {}{} CASCADE",
                self.qualify(&function.identifier),
                function.signature.as_deref().unwrap_or("")
            ),
            Fragment::CreateView { view } => format!(
                "CREATE OR REPLACE VIEW {} AS {}",
                self.qualify(&view.identifier),
                view.sql.trim_end_matches(';')
            ),
            Fragment::DropView { name } => {
                format!("DROP VIEW IF EXISTS {} CASCADE", self.qualify(name))
            }
            _ => standard::render(self, fragment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DbObjectName, IndexDefinition, ListPartition, Partitioning, Table, TableColumn,
    };

    fn people() -> Table {
        Table::new(DbObjectName::new("public", "people").unwrap())
            .with_column(TableColumn::new("id", "uuid").as_primary_key())
            .with_column(TableColumn::new("role", "varchar").as_primary_key())
            .with_column(TableColumn::new("age", "integer").with_check("age >= 0"))
    }

    #[test]
    fn test_create_table() {
        let provider = PostgresProvider::new();
        let table = people();
        let sql = provider.render(&Fragment::CreateTable { table: &table });
        assert!(sql.starts_with("CREATE TABLE \"public\".\"people\" ("));
        assert!(sql.contains("\"id\" uuid NOT NULL"));
        assert!(sql.contains("CONSTRAINT \"ck_people_age\" CHECK (age >= 0)"));
        assert!(sql.contains("CONSTRAINT \"pkey_people_id_role\" PRIMARY KEY (\"id\", \"role\")"));
        assert!(sql.ends_with(')'));
    }

    #[test]
    fn test_partitioned_table_and_partition() {
        let provider = PostgresProvider::new();
        let table = people().partitioned_by(
            Partitioning::list(&["role"], vec![ListPartition::new("admin", vec!["'admin'".into()])])
                .with_default_partition(),
        );
        let sql = provider.render(&Fragment::CreateTable { table: &table });
        assert!(sql.ends_with(") PARTITION BY LIST (\"role\")"));

        let partitions = table.partitioning.partitions();
        let admin = provider.render(&Fragment::CreatePartition {
            table: &table,
            partition: &partitions[0],
        });
        assert_eq!(
            admin,
            "CREATE TABLE \"public\".\"people_admin\" PARTITION OF \"public\".\"people\" FOR VALUES IN ('admin')"
        );
        let default = provider.render(&Fragment::CreatePartition {
            table: &table,
            partition: &partitions[1],
        });
        assert!(default.ends_with("DEFAULT"));
    }

    #[test]
    fn test_create_index_options() {
        let provider = PostgresProvider::new();
        let table = DbObjectName::new("public", "people").unwrap();
        let index = IndexDefinition::for_columns("people", &["data"])
            .with_method("gin")
            .with_fill_factor(70)
            .with_predicate("data IS NOT NULL");
        let sql = provider.render(&Fragment::CreateIndex {
            table: &table,
            index: &index,
        });
        assert_eq!(
            sql,
            "CREATE INDEX \"idx_people_data\" ON \"public\".\"people\" USING gin (\"data\") WITH (fillfactor = 70) WHERE data IS NOT NULL"
        );
    }

    #[test]
    fn test_map_type() {
        let provider = PostgresProvider::new();
        assert_eq!(provider.map_type("json"), "jsonb");
        assert_eq!(provider.map_type("String"), "varchar");
        assert_eq!(provider.map_type("tsvector"), "tsvector");
    }

    #[test]
    fn test_probe_sql_mentions_object() {
        let provider = PostgresProvider::new();
        let name = DbObjectName::new("public", "people").unwrap();
        let sql = provider.probe_sql(ObjectKind::Function, &name);
        assert!(sql.contains("pg_get_functiondef"));
        assert!(sql.contains("'people'"));
    }
}
