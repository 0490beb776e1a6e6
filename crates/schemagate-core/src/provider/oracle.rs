//! Oracle.

use super::standard;
use super::{literal, Capabilities, EngineKind, Fragment, Provider};
use crate::model::{DbObjectName, ObjectKind};

/// Oracle provider. Schemas are users and are never created here.
#[derive(Debug, Clone)]
pub struct OracleProvider {
    default_schema: String,
}

impl OracleProvider {
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
}

impl Default for OracleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for OracleProvider {
    fn kind(&self) -> EngineKind {
        EngineKind::Oracle
    }

    fn default_schema(&self) -> &str {
        &self.default_schema
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            partitioning: false,
            inline_partitions: false,
            alter_column_type: true,
            alter_constraints: true,
            schemas: false,
            create_or_replace_function: true,
            sequences: true,
        }
    }

    fn map_type(&self, generic: &str) -> String {
        match generic.to_lowercase().as_str() {
            "string" | "text" => "varchar2(4000)",
            "uuid" | "guid" => "raw(16)",
            "json" => "clob",
            "int" | "i32" => "number(10)",
            "long" | "i64" => "number(19)",
            "short" | "i16" => "number(5)",
            "bool" | "boolean" => "number(1)",
            "datetime" | "timestamp" => "timestamp with time zone",
            "date" => "date",
            "decimal" => "number",
            "double" | "f64" => "binary_double",
            "float" | "f32" => "binary_float",
            "bytes" => "blob",
            other => return other.to_string(),
        }
        .to_string()
    }

    fn probe_sql(&self, kind: ObjectKind, name: &DbObjectName) -> String {
        let owner = literal(&name.schema.to_uppercase());
        let object = literal(&name.name.to_uppercase());
        match kind {
            ObjectKind::Table => format!(
                "SELECT column_name, data_type, nullable, data_default FROM all_tab_columns \
                 WHERE owner = {} AND table_name = {} ORDER BY column_id",
                owner, object
            ),
            ObjectKind::Sequence => format!(
                "SELECT sequence_name FROM all_sequences WHERE sequence_owner = {} AND sequence_name = {}",
                owner, object
            ),
            ObjectKind::Function => format!(
                "SELECT text FROM all_source WHERE owner = {} AND name = {} ORDER BY line",
                owner, object
            ),
            ObjectKind::View => format!(
                "SELECT text FROM all_views WHERE owner = {} AND view_name = {}",
                owner, object
            ),
        }
    }

    fn render(&self, fragment: &Fragment<'_>) -> String {
        match *fragment {
            Fragment::DropTable { name } => format!(
                "DROP TABLE {} CASCADE CONSTRAINTS",
                self.qualify(name)
            ),
            Fragment::AddColumn { table, column } => format!(
                "ALTER TABLE {} ADD ({})",
                self.qualify(table),
                self.column_definition(table, column)
            ),
            Fragment::AlterColumnType { table, column } => format!(
                "ALTER TABLE {} MODIFY ({} {})",
                self.qualify(table),
                self.quote(&column.name),
                column.column_type
            ),
            Fragment::SetNullability { table, column } => format!(
                "ALTER TABLE {} MODIFY ({} {})",
                self.qualify(table),
                self.quote(&column.name),
                if column.nullable { "NULL" } else { "NOT NULL" }
            ),
            Fragment::SetDefault { table, column } => format!(
                "ALTER TABLE {} MODIFY ({} DEFAULT {})",
                self.qualify(table),
                self.quote(&column.name),
                column.default.as_deref().unwrap_or("NULL")
            ),
            Fragment::DropDefault { table, column } => format!(
                "ALTER TABLE {} MODIFY ({} DEFAULT NULL)",
                self.qualify(table),
                self.quote(&column.name)
            ),
            Fragment::DropIndex { table, index } => format!(
                "DROP INDEX {}",
                self.qualify(&table.with_name(index.name.clone()))
            ),
            Fragment::CopyRows { copy, page } => {
                standard::copy_rows(self, copy, page, |page| {
                    format!(
                        " OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                        page.offset, page.limit
                    )
                })
            }
            Fragment::DropSequence { name } => format!("DROP SEQUENCE {}", self.qualify(name)),
            Fragment::DropFunction { function } => {
                format!("DROP FUNCTION {}", self.qualify(&function.identifier))
            }
            Fragment::CreateView { view } => format!(
                "CREATE OR REPLACE VIEW {} AS {}",
                self.qualify(&view.identifier),
                view.sql.trim_end_matches(';')
            ),
            Fragment::DropView { name } => format!("DROP VIEW {}", self.qualify(name)),
            _ => standard::render(self, fragment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableColumn;

    #[test]
    fn test_schemas_are_not_created() {
        let provider = OracleProvider::new();
        assert_eq!(provider.render(&Fragment::CreateSchema { schema: "sales" }), "");
    }

    #[test]
    fn test_modify_syntax() {
        let provider = OracleProvider::new();
        let table = DbObjectName::new("app", "people").unwrap();
        let column = TableColumn::new("name", "varchar2(200)").not_null();
        assert_eq!(
            provider.render(&Fragment::SetNullability {
                table: &table,
                column: &column
            }),
            "ALTER TABLE \"app\".\"people\" MODIFY (\"name\" NOT NULL)"
        );
    }

    #[test]
    fn test_probe_uppercases_catalog_names() {
        let provider = OracleProvider::new();
        let sql = provider.probe_sql(ObjectKind::Table, &DbObjectName::new("app", "people").unwrap());
        assert!(sql.contains("'APP'"));
        assert!(sql.contains("'PEOPLE'"));
    }
}
