//! Microsoft SQL Server.

use super::standard::{self, quote_list};
use super::{literal, Capabilities, EngineKind, Fragment, Provider};
use crate::model::{DbObjectName, TableColumn};

/// SQL Server provider.
#[derive(Debug, Clone)]
pub struct SqlServerProvider {
    default_schema: String,
}

impl SqlServerProvider {
    /// Provider with `dbo` as the default schema.
    pub fn new() -> Self {
        Self {
            default_schema: "dbo".to_string(),
        }
    }

    /// Use another default schema.
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    fn default_constraint_name(table: &DbObjectName, column: &str) -> String {
        format!("df_{}_{}", table.name, column)
    }

    fn alter_column(&self, table: &DbObjectName, column: &TableColumn) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} {} {}",
            self.qualify(table),
            self.quote(&column.name),
            column.column_type,
            if column.nullable { "NULL" } else { "NOT NULL" }
        )
    }
}

impl Default for SqlServerProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for SqlServerProvider {
    fn kind(&self) -> EngineKind {
        EngineKind::SqlServer
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
            schemas: true,
            create_or_replace_function: true,
            sequences: true,
        }
    }

    fn quote(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn map_type(&self, generic: &str) -> String {
        match generic.to_lowercase().as_str() {
            "string" | "text" => "nvarchar(max)",
            "uuid" | "guid" => "uniqueidentifier",
            "json" => "nvarchar(max)",
            "int" | "i32" => "int",
            "long" | "i64" => "bigint",
            "short" | "i16" => "smallint",
            "bool" | "boolean" => "bit",
            "datetime" | "timestamp" => "datetimeoffset",
            "date" => "date",
            "decimal" => "decimal",
            "double" | "f64" => "float",
            "float" | "f32" => "real",
            "bytes" => "varbinary(max)",
            other => return other.to_string(),
        }
        .to_string()
    }

    fn column_definition(&self, table: &DbObjectName, column: &TableColumn) -> String {
        let mut sql = format!(
            "{} {} {}",
            self.quote(&column.name),
            column.column_type,
            if column.nullable { "NULL" } else { "NOT NULL" }
        );
        if let Some(default) = &column.default {
            sql.push_str(&format!(
                " CONSTRAINT {} DEFAULT {}",
                self.quote(&Self::default_constraint_name(table, &column.name)),
                default
            ));
        }
        sql
    }

    fn render(&self, fragment: &Fragment<'_>) -> String {
        match *fragment {
            Fragment::CreateSchema { schema } => format!(
                "IF NOT EXISTS (SELECT * FROM sys.schemas WHERE name = {}) EXEC('CREATE SCHEMA {}')",
                literal(schema),
                self.quote(schema)
            ),
            Fragment::RenameTable { from, to } => format!(
                "EXEC sp_rename {}, {}",
                literal(&from.qualified_name()),
                literal(to)
            ),
            Fragment::AddColumn { table, column } => format!(
                "ALTER TABLE {} ADD {}",
                self.qualify(table),
                self.column_definition(table, column)
            ),
            Fragment::AlterColumnType { table, column }
            | Fragment::SetNullability { table, column } => self.alter_column(table, column),
            Fragment::SetDefault { table, column } => match &column.default {
                Some(default) => format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} DEFAULT {} FOR {}",
                    self.qualify(table),
                    self.quote(&Self::default_constraint_name(table, &column.name)),
                    default,
                    self.quote(&column.name)
                ),
                None => String::new(),
            },
            Fragment::DropDefault { table, column } => format!(
                "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}",
                self.qualify(table),
                self.quote(&Self::default_constraint_name(table, &column.name))
            ),
            Fragment::CreateIndex { table, index } => {
                let mut sql = format!(
                    "CREATE {}INDEX {} ON {} ({})",
                    if index.unique { "UNIQUE " } else { "" },
                    self.quote(&index.name),
                    self.qualify(table),
                    standard::index_columns(self, index)
                );
                if let Some(predicate) = &index.predicate {
                    sql.push_str(&format!(" WHERE {}", predicate));
                }
                if let Some(fill_factor) = index.fill_factor {
                    sql.push_str(&format!(" WITH (FILLFACTOR = {})", fill_factor));
                }
                sql
            }
            Fragment::DropIndex { table, index } => format!(
                "DROP INDEX IF EXISTS {} ON {}",
                self.quote(&index.name),
                self.qualify(table)
            ),
            Fragment::CopyRows { copy, page } => {
                standard::copy_rows(self, copy, page, |page| {
                    format!(
                        " OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                        page.offset, page.limit
                    )
                })
            }
            Fragment::AddPrimaryKey { table, name, columns } => format!(
                "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY CLUSTERED ({})",
                self.qualify(table),
                self.quote(name),
                quote_list(self, columns)
            ),
            Fragment::DropFunction { function } => format!(
                "DROP FUNCTION IF EXISTS {}",
                self.qualify(&function.identifier)
            ),
            Fragment::CreateView { view } => format!(
                "CREATE OR ALTER VIEW {} AS {}",
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
    use crate::writer::{CopyPage, CopyRows};

    fn people() -> DbObjectName {
        DbObjectName::new("dbo", "people").unwrap()
    }

    #[test]
    fn test_bracket_quoting() {
        let provider = SqlServerProvider::new();
        assert_eq!(provider.qualify(&people()), "[dbo].[people]");
        assert_eq!(provider.quote("odd]name"), "[odd]]name]");
    }

    #[test]
    fn test_alter_column_restates_nullability() {
        let provider = SqlServerProvider::new();
        let column = TableColumn::new("name", "nvarchar(200)").not_null();
        let sql = provider.render(&Fragment::AlterColumnType {
            table: &people(),
            column: &column,
        });
        assert_eq!(sql, "ALTER TABLE [dbo].[people] ALTER COLUMN [name] nvarchar(200) NOT NULL");
    }

    #[test]
    fn test_named_default_constraint() {
        let provider = SqlServerProvider::new();
        let column = TableColumn::new("active", "bit").with_default("1");
        let sql = provider.render(&Fragment::AddColumn {
            table: &people(),
            column: &column,
        });
        assert!(sql.contains("CONSTRAINT [df_people_active] DEFAULT 1"));
    }

    #[test]
    fn test_paged_copy() {
        let provider = SqlServerProvider::new();
        let copy = CopyRows {
            source: people(),
            target: people().with_suffix("rebuild"),
            columns: vec!["id".into()],
            order_by: vec!["id".into()],
        };
        let sql = provider.render(&Fragment::CopyRows {
            copy: &copy,
            page: Some(CopyPage { offset: 20, limit: 10 }),
        });
        assert!(sql.ends_with("ORDER BY [id] OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"));
    }
}
