//! Qualified object names.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum identifier length accepted across engines.
/// - PostgreSQL: 63 bytes
/// - SQL Server: 128 characters
/// - MySQL: 64 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate a single identifier part.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidIdentifier(
            "identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(Error::InvalidIdentifier(format!(
            "identifier contains a null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(Error::InvalidIdentifier(format!(
            "identifier exceeds {} bytes (got {}): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// A schema-qualified object name.
///
/// Equality and hashing ignore case, matching how the supported engines
/// resolve unquoted identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbObjectName {
    /// Schema (namespace) the object lives in.
    pub schema: String,
    /// Object name within the schema.
    pub name: String,
}

impl DbObjectName {
    /// Create a validated name.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        let name = name.into();
        validate_identifier(&schema)?;
        validate_identifier(&name)?;
        Ok(Self { schema, name })
    }

    /// Parse `schema.name` or a bare `name` in `default_schema`.
    pub fn parse(raw: &str, default_schema: &str) -> Result<Self> {
        let raw = raw.trim();
        match raw.split_once('.') {
            Some((schema, name)) => Self::new(unquote(schema), unquote(name)),
            None => Self::new(default_schema, unquote(raw)),
        }
    }

    /// The `schema.name` form.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// A sibling name in the same schema.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            schema: self.schema.clone(),
            name: name.into(),
        }
    }

    /// A sibling name built by appending `_suffix`.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        self.with_name(format!("{}_{}", self.name, suffix))
    }

    /// Case-insensitive lookup key.
    pub fn key(&self) -> String {
        self.qualified_name().to_lowercase()
    }
}

fn unquote(part: &str) -> &str {
    part.trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']')
}

impl PartialEq for DbObjectName {
    fn eq(&self, other: &Self) -> bool {
        self.schema.eq_ignore_ascii_case(&other.schema) && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for DbObjectName {}

impl Hash for DbObjectName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for DbObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Compare two names ignoring case.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Compare two ordered name lists ignoring case.
pub(crate) fn same_names(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_name(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualified() {
        let name = DbObjectName::parse("sales.orders", "public").unwrap();
        assert_eq!(name.schema, "sales");
        assert_eq!(name.name, "orders");
        assert_eq!(name.qualified_name(), "sales.orders");
    }

    #[test]
    fn test_parse_default_schema_and_quotes() {
        let name = DbObjectName::parse("\"people\"", "public").unwrap();
        assert_eq!(name.qualified_name(), "public.people");

        let name = DbObjectName::parse("[dbo].[people]", "public").unwrap();
        assert_eq!(name.qualified_name(), "dbo.people");
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = DbObjectName::new("Public", "People").unwrap();
        let b = DbObjectName::new("public", "people").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_rejects_invalid_names() {
        assert!(DbObjectName::new("public", "").is_err());
        assert!(DbObjectName::new("public", "bad\0name").is_err());
        assert!(DbObjectName::new("public", "x".repeat(129)).is_err());
    }

    #[test]
    fn test_suffix() {
        let name = DbObjectName::new("public", "people").unwrap();
        assert_eq!(name.with_suffix("rebuild").qualified_name(), "public.people_rebuild");
    }
}
