//! DDL accumulation.

use crate::model::DbObjectName;
use crate::provider::{Fragment, Provider};

/// Copy every row of `source` into `target` for a table rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyRows {
    /// Table read from.
    pub source: DbObjectName,
    /// Table written to.
    pub target: DbObjectName,
    /// Columns present in both layouts.
    pub columns: Vec<String>,
    /// Stable ordering used for paging.
    pub order_by: Vec<String>,
}

/// One page of a batched row copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyPage {
    /// Rows skipped.
    pub offset: u64,
    /// Rows copied at most.
    pub limit: u64,
}

/// A unit of generated DDL.
#[derive(Debug, Clone, PartialEq)]
pub enum DdlStatement {
    /// Plain SQL, executed as is.
    Sql(String),
    /// A row copy, executed in pages when applied.
    CopyRows(CopyRows),
    /// A script comment, never executed.
    Comment(String),
}

impl DdlStatement {
    /// Render for a script. Row copies render as a single statement.
    pub fn render(&self, provider: &dyn Provider) -> String {
        match self {
            DdlStatement::Sql(sql) => sql.clone(),
            DdlStatement::CopyRows(copy) => provider.render(&Fragment::CopyRows { copy, page: None }),
            DdlStatement::Comment(text) => format!("-- {}", text),
        }
    }

    /// Whether the statement is sent to the engine.
    pub fn is_executable(&self) -> bool {
        !matches!(self, DdlStatement::Comment(_))
    }
}

/// Collects generated DDL in order.
#[derive(Debug, Clone, Default)]
pub struct DdlWriter {
    statements: Vec<DdlStatement>,
}

impl DdlWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement. Blank statements are skipped, which lets
    /// providers render unsupported fragments as empty strings.
    pub fn write(&mut self, sql: impl Into<String>) {
        let sql = sql.into();
        let trimmed = sql.trim();
        if !trimmed.is_empty() {
            self.statements.push(DdlStatement::Sql(trimmed.to_string()));
        }
    }

    /// Append a row copy.
    pub fn write_copy(&mut self, copy: CopyRows) {
        self.statements.push(DdlStatement::CopyRows(copy));
    }

    /// Append a script comment.
    pub fn write_comment(&mut self, text: impl Into<String>) {
        self.statements.push(DdlStatement::Comment(text.into()));
    }

    /// Statements written so far.
    pub fn statements(&self) -> &[DdlStatement] {
        &self.statements
    }

    /// Take the statements.
    pub fn into_statements(self) -> Vec<DdlStatement> {
        self.statements
    }

    /// Number of executable statements.
    pub fn executable_count(&self) -> usize {
        self.statements.iter().filter(|s| s.is_executable()).count()
    }

    /// Whether nothing executable was written.
    pub fn is_empty(&self) -> bool {
        self.executable_count() == 0
    }

    /// Render a script, one statement per line, each terminated.
    pub fn to_script(&self, provider: &dyn Provider) -> String {
        let mut script = String::new();
        for statement in &self.statements {
            let rendered = statement.render(provider);
            script.push_str(&rendered);
            if statement.is_executable() && !rendered.ends_with(';') {
                script.push(';');
            }
            script.push('\n');
        }
        script
    }
}
