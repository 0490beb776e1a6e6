//! SQLite.

use super::standard;
use super::{literal, Capabilities, EngineKind, Fragment, Provider};
use crate::model::{DbObjectName, ObjectKind};

/// SQLite provider.
///
/// SQLite cannot alter columns or constraints in place, so those changes
/// take the table rebuild path. Names are never schema-qualified.
#[derive(Debug, Clone, Default)]
pub struct SqliteProvider;

impl SqliteProvider {
    /// Create the provider.
    pub fn new() -> Self {
        Self
    }
}

impl Provider for SqliteProvider {
    fn kind(&self) -> EngineKind {
        EngineKind::Sqlite
    }

    fn default_schema(&self) -> &str {
        "main"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            partitioning: false,
            inline_partitions: false,
            alter_column_type: false,
            alter_constraints: false,
            schemas: false,
            create_or_replace_function: false,
            sequences: false,
        }
    }

    fn qualify(&self, name: &DbObjectName) -> String {
        self.quote(&name.name)
    }

    fn map_type(&self, generic: &str) -> String {
        match generic.to_lowercase().as_str() {
            "string" | "text" | "uuid" | "guid" | "json" | "datetime" | "timestamp" | "date" => {
                "text"
            }
            "int" | "i32" | "long" | "i64" | "short" | "i16" | "bool" | "boolean" => "integer",
            "decimal" => "numeric",
            "double" | "f64" | "float" | "f32" => "real",
            "bytes" => "blob",
            other => return other.to_string(),
        }
        .to_string()
    }

    fn probe_sql(&self, kind: ObjectKind, name: &DbObjectName) -> String {
        let object = literal(&name.name);
        match kind {
            ObjectKind::Table => format!(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = {};\n\
                 SELECT * FROM pragma_table_info({});\n\
                 SELECT * FROM pragma_index_list({});\n\
                 SELECT * FROM pragma_foreign_key_list({})",
                object, object, object, object
            ),
            ObjectKind::View => format!(
                "SELECT sql FROM sqlite_master WHERE type = 'view' AND name = {}",
                object
            ),
            ObjectKind::Sequence | ObjectKind::Function => String::new(),
        }
    }

    fn render(&self, fragment: &Fragment<'_>) -> String {
        match *fragment {
            Fragment::AlterColumnType { .. }
            | Fragment::SetNullability { .. }
            | Fragment::SetDefault { .. }
            | Fragment::DropDefault { .. }
            | Fragment::AddCheck { .. }
            | Fragment::DropCheck { .. }
            | Fragment::AddPrimaryKey { .. }
            | Fragment::DropPrimaryKey { .. }
            | Fragment::AddForeignKey { .. }
            | Fragment::DropForeignKey { .. }
            | Fragment::CreateFunction { .. }
            | Fragment::DropFunction { .. } => String::new(),
            Fragment::CreateTable { table } => {
                // Foreign keys can only be declared with the table.
                let sql = standard::create_table(self, table);
                if table.foreign_keys.is_empty() {
                    return sql;
                }
                let body = sql.trim_end_matches(')');
                let keys = table
                    .foreign_keys
                    .iter()
                    .map(|fk| {
                        format!(
                            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}){}",
                            self.quote(&fk.name),
                            standard::quote_list(self, &fk.columns),
                            self.qualify(&fk.linked_table),
                            standard::quote_list(self, &fk.linked_columns),
                            standard::referential_actions(fk)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(",\n    ");
                format!("{},\n    {}\n)", body.trim_end(), keys)
            }
            Fragment::DropIndex { index, .. } => {
                format!("DROP INDEX IF EXISTS {}", self.quote(&index.name))
            }
            Fragment::CreateView { view } => format!(
                "CREATE VIEW IF NOT EXISTS {} AS {}",
                self.qualify(&view.identifier),
                view.sql.trim_end_matches(';')
            ),
            _ => standard::render(self, fragment),
        }
    }
}
