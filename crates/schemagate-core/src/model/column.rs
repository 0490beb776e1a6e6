//! Table column definitions.

use serde::{Deserialize, Serialize};

use super::identifier::same_name;
use crate::provider::Provider;

/// A column within a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Column name.
    pub name: String,
    /// Engine type as declared (e.g. `varchar(100)`, `jsonb`).
    pub column_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default expression, rendered verbatim.
    pub default: Option<String>,
    /// Check expression, rendered verbatim.
    pub check: Option<String>,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

impl TableColumn {
    /// Create a nullable column.
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable: true,
            default: None,
            check: None,
            primary_key: false,
        }
    }

    /// Create a nullable column from a portable type name (`string`, `uuid`,
    /// `json`, ...), resolved to the engine type when declared so that it
    /// compares against the live catalog spelling.
    pub fn portable(name: impl Into<String>, generic: &str, provider: &dyn Provider) -> Self {
        Self::new(name, provider.map_type(generic))
    }

    /// Mark as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as part of the primary key (implies NOT NULL).
    pub fn as_primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Set the default expression.
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(expression.into());
        self
    }

    /// Set the check expression.
    pub fn with_check(mut self, expression: impl Into<String>) -> Self {
        self.check = Some(expression.into());
        self
    }

    /// Whether the declared types denote the same engine type.
    pub fn type_matches(&self, other: &TableColumn) -> bool {
        canonical_type(&self.column_type) == canonical_type(&other.column_type)
    }

    /// Compare everything but the name and primary-key flag.
    pub fn matches(&self, other: &TableColumn) -> bool {
        same_name(&self.name, &other.name)
            && self.type_matches(other)
            && self.nullable == other.nullable
            && self.default_matches(other)
            && self.check_matches(other)
    }

    /// Whether the default expressions are equivalent.
    pub fn default_matches(&self, other: &TableColumn) -> bool {
        same_expression(&self.default, &other.default)
    }

    /// Whether the check expressions are equivalent.
    pub fn check_matches(&self, other: &TableColumn) -> bool {
        same_expression(&self.check, &other.check)
    }
}

fn same_expression(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => normalize_expression(a) == normalize_expression(b),
        _ => false,
    }
}

/// Collapse whitespace and strip wrapping parentheses engines add when
/// reporting stored expressions.
pub(crate) fn normalize_expression(expression: &str) -> String {
    let mut normalized = collapse_whitespace(expression);
    while normalized.starts_with('(') && normalized.ends_with(')') && balanced(&normalized[1..normalized.len() - 1]) {
        normalized = normalized[1..normalized.len() - 1].trim().to_string();
    }
    normalized
}

fn balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical spelling of a column type for comparison.
pub fn canonical_type(column_type: &str) -> String {
    let lowered = collapse_whitespace(&column_type.to_lowercase());
    let (base, args) = match lowered.find('(') {
        Some(idx) => (lowered[..idx].trim().to_string(), lowered[idx..].replace(' ', "")),
        None => (lowered.clone(), String::new()),
    };

    let base = match base.as_str() {
        "int" | "integer" | "int4" | "serial" => "integer",
        "bigint" | "int8" | "bigserial" => "bigint",
        "smallint" | "int2" => "smallint",
        "character varying" | "varchar" => "varchar",
        "character" | "char" | "bpchar" => "char",
        "bool" | "boolean" => "boolean",
        "float8" | "double precision" | "double" => "double precision",
        "float4" | "real" => "real",
        "decimal" | "numeric" => "numeric",
        "timestamptz" | "timestamp with time zone" => "timestamptz",
        "timestamp" | "timestamp without time zone" => "timestamp",
        "timetz" | "time with time zone" => "timetz",
        "time" | "time without time zone" => "time",
        other => other,
    };

    format!("{}{}", base, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_builder() {
        let column = TableColumn::new("id", "uuid").as_primary_key();
        assert!(column.primary_key);
        assert!(!column.nullable);

        let column = TableColumn::new("age", "int").with_default("0").with_check("age >= 0");
        assert!(column.nullable);
        assert_eq!(column.default.as_deref(), Some("0"));
    }

    #[test]
    fn test_portable_column_uses_engine_type() {
        use crate::provider::{MySqlProvider, PostgresProvider};

        let column = TableColumn::portable("doc", "json", &PostgresProvider::new());
        assert_eq!(column.column_type, "jsonb");
        let column = TableColumn::portable("id", "uuid", &MySqlProvider::new());
        assert_eq!(column.column_type, "char(36)");
        let column = TableColumn::portable("tags", "text[]", &PostgresProvider::new());
        assert_eq!(column.column_type, "text[]");
    }

    #[test]
    fn test_type_aliases_match() {
        assert_eq!(canonical_type("INTEGER"), canonical_type("int4"));
        assert_eq!(canonical_type("character varying(100)"), canonical_type("varchar( 100 )"));
        assert_eq!(canonical_type("timestamp with time zone"), "timestamptz");
        assert_ne!(canonical_type("varchar(100)"), canonical_type("varchar(200)"));
    }

    #[test]
    fn test_matches_ignores_case_and_wrapping() {
        let expected = TableColumn::new("Name", "varchar").not_null().with_default("'none'");
        let actual = TableColumn::new("name", "character varying").not_null().with_default("('none')");
        assert!(expected.matches(&actual));

        let nullable = TableColumn::new("name", "varchar").with_default("'none'");
        assert!(!expected.matches(&nullable));
    }

    #[test]
    fn test_normalize_keeps_unbalanced_parens() {
        assert_eq!(normalize_expression("(a) + (b)"), "(a) + (b)");
        assert_eq!(normalize_expression("((a + b))"), "a + b");
    }
}
