//! ANSI-flavoured rendering shared by the engine providers.
//!
//! Each provider overrides the fragments its engine spells differently and
//! falls back to these functions for the rest.

use super::{check_constraint_name, literal, Fragment, Provider};
use crate::model::{
    CascadeAction, DbObjectName, ForeignKey, IndexDefinition, ObjectKind, SortOrder, Table,
    TableColumn,
};
use crate::writer::{CopyPage, CopyRows};

/// Render a fragment in the common dialect.
pub(crate) fn render<P: Provider + ?Sized>(p: &P, fragment: &Fragment<'_>) -> String {
    let caps = p.capabilities();
    match *fragment {
        Fragment::CreateSchema { schema } => {
            if caps.schemas {
                format!("CREATE SCHEMA IF NOT EXISTS {}", p.quote(schema))
            } else {
                String::new()
            }
        }
        Fragment::CreateTable { table } => create_table(p, table),
        Fragment::DropTable { name } => format!("DROP TABLE IF EXISTS {}", p.qualify(name)),
        Fragment::RenameTable { from, to } => {
            format!("ALTER TABLE {} RENAME TO {}", p.qualify(from), p.quote(to))
        }
        Fragment::AddColumn { table, column } => format!(
            "ALTER TABLE {} ADD COLUMN {}",
            p.qualify(table),
            p.column_definition(table, column)
        ),
        Fragment::DropColumn { table, column } => format!(
            "ALTER TABLE {} DROP COLUMN {}",
            p.qualify(table),
            p.quote(column)
        ),
        Fragment::AlterColumnType { table, column } => format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            p.qualify(table),
            p.quote(&column.name),
            column.column_type
        ),
        Fragment::SetNullability { table, column } => format!(
            "ALTER TABLE {} ALTER COLUMN {} {} NOT NULL",
            p.qualify(table),
            p.quote(&column.name),
            if column.nullable { "DROP" } else { "SET" }
        ),
        Fragment::SetDefault { table, column } => match &column.default {
            Some(default) => format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {}",
                p.qualify(table),
                p.quote(&column.name),
                default
            ),
            None => String::new(),
        },
        Fragment::DropDefault { table, column } => format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
            p.qualify(table),
            p.quote(&column.name)
        ),
        Fragment::AddCheck { table, column } => match &column.check {
            Some(check) => format!(
                "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({})",
                p.qualify(table),
                p.quote(&check_constraint_name(table, &column.name)),
                check
            ),
            None => String::new(),
        },
        Fragment::DropCheck { table, column } => format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            p.qualify(table),
            p.quote(&check_constraint_name(table, column))
        ),
        Fragment::AddPrimaryKey { table, name, columns } => format!(
            "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
            p.qualify(table),
            p.quote(name),
            quote_list(p, columns)
        ),
        Fragment::DropPrimaryKey { table, name } => format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            p.qualify(table),
            p.quote(name)
        ),
        Fragment::CreateIndex { table, index } => create_index(p, table, index),
        Fragment::DropIndex { table, index } => format!(
            "DROP INDEX IF EXISTS {}",
            p.qualify(&table.with_name(index.name.clone()))
        ),
        Fragment::AddForeignKey { table, foreign_key } => add_foreign_key(p, table, foreign_key),
        Fragment::DropForeignKey { table, name } => format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            p.qualify(table),
            p.quote(name)
        ),
        Fragment::CreatePartition { .. } | Fragment::DropPartition { .. } => String::new(),
        Fragment::CopyRows { copy, page } => copy_rows(p, copy, page, |page| {
            format!(" LIMIT {} OFFSET {}", page.limit, page.offset)
        }),
        Fragment::CreateSequence { sequence } => {
            if !caps.sequences {
                return String::new();
            }
            let mut sql = format!("CREATE SEQUENCE {}", p.qualify(&sequence.identifier));
            if let Some(start) = sequence.start_with {
                sql.push_str(&format!(" START WITH {}", start));
            }
            sql
        }
        Fragment::DropSequence { name } => {
            if caps.sequences {
                format!("DROP SEQUENCE IF EXISTS {}", p.qualify(name))
            } else {
                String::new()
            }
        }
        Fragment::CreateFunction { function } => function.body.clone().unwrap_or_default(),
        Fragment::DropFunction { function } => format!(
            "DROP FUNCTION IF EXISTS {}{}",
            p.qualify(&function.identifier),
            function.signature.as_deref().unwrap_or("")
        ),
        Fragment::CreateView { view } => {
            format!("CREATE VIEW {} AS {}", p.qualify(&view.identifier), view.sql.trim_end_matches(';'))
        }
        Fragment::DropView { name } => format!("DROP VIEW IF EXISTS {}", p.qualify(name)),
    }
}

/// `"name" type [NOT NULL] [DEFAULT expr]`.
pub(crate) fn column_definition<P: Provider + ?Sized>(p: &P, column: &TableColumn) -> String {
    let mut sql = format!("{} {}", p.quote(&column.name), column.column_type);
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        sql.push_str(&format!(" DEFAULT {}", default));
    }
    sql
}

pub(crate) fn create_table<P: Provider + ?Sized>(p: &P, table: &Table) -> String {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|c| p.column_definition(&table.identifier, c))
        .collect();

    for column in &table.columns {
        if let Some(check) = &column.check {
            lines.push(format!(
                "CONSTRAINT {} CHECK ({})",
                p.quote(&check_constraint_name(&table.identifier, &column.name)),
                check
            ));
        }
    }

    let primary_key = table.primary_key_columns();
    if !primary_key.is_empty() {
        lines.push(format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            p.quote(&table.primary_key_name()),
            quote_list(p, &primary_key)
        ));
    }

    format!(
        "CREATE TABLE {} (\n    {}\n){}",
        p.qualify(&table.identifier),
        lines.join(",\n    "),
        p.partition_clause(table)
    )
}

pub(crate) fn create_index<P: Provider + ?Sized>(
    p: &P,
    table: &DbObjectName,
    index: &IndexDefinition,
) -> String {
    let mut sql = format!(
        "CREATE {}INDEX {} ON {} ({})",
        if index.unique { "UNIQUE " } else { "" },
        p.quote(&index.name),
        p.qualify(table),
        index_columns(p, index)
    );
    if let Some(predicate) = &index.predicate {
        sql.push_str(&format!(" WHERE {}", predicate));
    }
    sql
}

pub(crate) fn index_columns<P: Provider + ?Sized>(p: &P, index: &IndexDefinition) -> String {
    index
        .columns
        .iter()
        .map(|c| {
            let column = quote_column_or_expression(p, c);
            match index.sort_order {
                SortOrder::Asc => column,
                SortOrder::Desc => format!("{} DESC", column),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn add_foreign_key<P: Provider + ?Sized>(
    p: &P,
    table: &DbObjectName,
    foreign_key: &ForeignKey,
) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        p.qualify(table),
        p.quote(&foreign_key.name),
        quote_list(p, &foreign_key.columns),
        p.qualify(&foreign_key.linked_table),
        quote_list(p, &foreign_key.linked_columns)
    );
    sql.push_str(&referential_actions(foreign_key));
    sql
}

pub(crate) fn referential_actions(foreign_key: &ForeignKey) -> String {
    let mut sql = String::new();
    if foreign_key.on_delete != CascadeAction::NoAction {
        sql.push_str(&format!(" ON DELETE {}", foreign_key.on_delete.as_sql()));
    }
    if foreign_key.on_update != CascadeAction::NoAction {
        sql.push_str(&format!(" ON UPDATE {}", foreign_key.on_update.as_sql()));
    }
    sql
}

/// `INSERT INTO target (cols) SELECT cols FROM source`, with a paging clause
/// produced by `paging` when a page is requested.
pub(crate) fn copy_rows<P, F>(p: &P, copy: &CopyRows, page: Option<CopyPage>, paging: F) -> String
where
    P: Provider + ?Sized,
    F: Fn(CopyPage) -> String,
{
    let columns = quote_list(p, &copy.columns);
    let mut sql = format!(
        "INSERT INTO {} ({}) SELECT {} FROM {}",
        p.qualify(&copy.target),
        columns,
        columns,
        p.qualify(&copy.source)
    );
    if let Some(page) = page {
        sql.push_str(&format!(" ORDER BY {}", quote_list(p, &copy.order_by)));
        sql.push_str(&paging(page));
    }
    sql
}

pub(crate) fn quote_list<P: Provider + ?Sized>(p: &P, names: &[String]) -> String {
    names.iter().map(|n| p.quote(n)).collect::<Vec<_>>().join(", ")
}

/// Plain identifiers are quoted, expressions are written verbatim.
pub(crate) fn quote_column_or_expression<P: Provider + ?Sized>(p: &P, column: &str) -> String {
    if column.chars().all(|c| c.is_alphanumeric() || c == '_') {
        p.quote(column)
    } else {
        column.to_string()
    }
}

/// information_schema lookup for one object.
pub(crate) fn probe_sql<P: Provider + ?Sized>(_p: &P, kind: ObjectKind, name: &DbObjectName) -> String {
    let schema = literal(&name.schema);
    let object = literal(&name.name);
    match kind {
        ObjectKind::Table => format!(
            "SELECT column_name, data_type, is_nullable, column_default \
             FROM information_schema.columns \
             WHERE table_schema = {} AND table_name = {} ORDER BY ordinal_position",
            schema, object
        ),
        ObjectKind::Sequence => format!(
            "SELECT sequence_name FROM information_schema.sequences \
             WHERE sequence_schema = {} AND sequence_name = {}",
            schema, object
        ),
        ObjectKind::Function => format!(
            "SELECT routine_definition FROM information_schema.routines \
             WHERE routine_schema = {} AND routine_name = {}",
            schema, object
        ),
        ObjectKind::View => format!(
            "SELECT view_definition FROM information_schema.views \
             WHERE table_schema = {} AND table_name = {}",
            schema, object
        ),
    }
}
