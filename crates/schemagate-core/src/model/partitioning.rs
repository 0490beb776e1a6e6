//! Table partitioning strategies.

use serde::{Deserialize, Serialize};

/// One partition of a list-partitioned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPartition {
    /// Suffix appended to the parent table name.
    pub suffix: String,
    /// Values (SQL literals) routed to this partition.
    pub values: Vec<String>,
}

impl ListPartition {
    /// Create a list partition.
    pub fn new(suffix: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            suffix: suffix.into(),
            values,
        }
    }

    fn same_values(&self, other: &ListPartition) -> bool {
        let mut a: Vec<_> = self.values.iter().map(|v| v.trim()).collect();
        let mut b: Vec<_> = other.values.iter().map(|v| v.trim()).collect();
        a.sort();
        b.sort();
        a == b
    }
}

/// One partition of a range-partitioned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePartition {
    /// Suffix appended to the parent table name.
    pub suffix: String,
    /// Inclusive lower bound (SQL literal).
    pub from: String,
    /// Exclusive upper bound (SQL literal).
    pub to: String,
}

impl RangePartition {
    /// Create a range partition.
    pub fn new(suffix: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Hash partitioning: modulus is the suffix count, remainder the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashPartitioning {
    /// Partition key columns.
    pub columns: Vec<String>,
    /// Partition suffixes in remainder order.
    pub suffixes: Vec<String>,
}

/// List partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPartitioning {
    /// Partition key columns.
    pub columns: Vec<String>,
    /// Declared partitions.
    pub partitions: Vec<ListPartition>,
    /// Whether a `_default` partition catches unlisted values.
    pub default_enabled: bool,
}

/// Range partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePartitioning {
    /// Partition key columns.
    pub columns: Vec<String>,
    /// Declared ranges.
    pub ranges: Vec<RangePartition>,
}

/// Physical row-distribution strategy of a table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Partitioning {
    /// Not partitioned.
    #[default]
    None,
    /// Hash partitioned.
    Hash(HashPartitioning),
    /// List partitioned.
    List(ListPartitioning),
    /// Range partitioned.
    Range(RangePartitioning),
}

/// Strategy discriminant, used for comparisons and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// Not partitioned.
    None,
    /// Hash.
    Hash,
    /// List.
    List,
    /// Range.
    Range,
}

impl PartitionStrategy {
    /// SQL keyword for the strategy.
    pub fn as_sql(&self) -> &'static str {
        match self {
            PartitionStrategy::None => "",
            PartitionStrategy::Hash => "HASH",
            PartitionStrategy::List => "LIST",
            PartitionStrategy::Range => "RANGE",
        }
    }
}

/// A single partition with its strategy-specific bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TablePartition {
    /// Hash partition.
    Hash {
        /// Suffix appended to the parent table name.
        suffix: String,
        /// Number of hash partitions.
        modulus: usize,
        /// Remainder routed to this partition.
        remainder: usize,
    },
    /// List partition.
    List(ListPartition),
    /// Range partition.
    Range(RangePartition),
    /// Catch-all partition of a list-partitioned table.
    Default,
}

impl TablePartition {
    /// Suffix appended to the parent table name.
    pub fn suffix(&self) -> &str {
        match self {
            TablePartition::Hash { suffix, .. } => suffix,
            TablePartition::List(p) => &p.suffix,
            TablePartition::Range(p) => &p.suffix,
            TablePartition::Default => "default",
        }
    }

    /// Same suffix and same bounds.
    pub fn matches(&self, other: &TablePartition) -> bool {
        if !self.suffix().eq_ignore_ascii_case(other.suffix()) {
            return false;
        }
        match (self, other) {
            (
                TablePartition::Hash { modulus: m1, remainder: r1, .. },
                TablePartition::Hash { modulus: m2, remainder: r2, .. },
            ) => m1 == m2 && r1 == r2,
            (TablePartition::List(a), TablePartition::List(b)) => a.same_values(b),
            (TablePartition::Range(a), TablePartition::Range(b)) => {
                a.from.trim() == b.from.trim() && a.to.trim() == b.to.trim()
            }
            (TablePartition::Default, TablePartition::Default) => true,
            _ => false,
        }
    }
}

impl Partitioning {
    /// Hash partitioning over `columns` with the given suffixes.
    pub fn hash(columns: &[&str], suffixes: &[&str]) -> Self {
        Partitioning::Hash(HashPartitioning {
            columns: to_strings(columns),
            suffixes: to_strings(suffixes),
        })
    }

    /// List partitioning without a default partition.
    pub fn list(columns: &[&str], partitions: Vec<ListPartition>) -> Self {
        Partitioning::List(ListPartitioning {
            columns: to_strings(columns),
            partitions,
            default_enabled: false,
        })
    }

    /// Range partitioning.
    pub fn range(columns: &[&str], ranges: Vec<RangePartition>) -> Self {
        Partitioning::Range(RangePartitioning {
            columns: to_strings(columns),
            ranges,
        })
    }

    /// Enable the default partition of a list-partitioned table.
    pub fn with_default_partition(mut self) -> Self {
        if let Partitioning::List(list) = &mut self {
            list.default_enabled = true;
        }
        self
    }

    /// The strategy discriminant.
    pub fn strategy(&self) -> PartitionStrategy {
        match self {
            Partitioning::None => PartitionStrategy::None,
            Partitioning::Hash(_) => PartitionStrategy::Hash,
            Partitioning::List(_) => PartitionStrategy::List,
            Partitioning::Range(_) => PartitionStrategy::Range,
        }
    }

    /// Partition key columns (empty when not partitioned).
    pub fn columns(&self) -> &[String] {
        match self {
            Partitioning::None => &[],
            Partitioning::Hash(h) => &h.columns,
            Partitioning::List(l) => &l.columns,
            Partitioning::Range(r) => &r.columns,
        }
    }

    /// Whether the table is partitioned at all.
    pub fn is_partitioned(&self) -> bool {
        !matches!(self, Partitioning::None)
    }

    /// Every partition, including the list default partition when enabled.
    pub fn partitions(&self) -> Vec<TablePartition> {
        match self {
            Partitioning::None => Vec::new(),
            Partitioning::Hash(h) => {
                let modulus = h.suffixes.len();
                h.suffixes
                    .iter()
                    .enumerate()
                    .map(|(remainder, suffix)| TablePartition::Hash {
                        suffix: suffix.clone(),
                        modulus,
                        remainder,
                    })
                    .collect()
            }
            Partitioning::List(l) => {
                let mut partitions: Vec<_> =
                    l.partitions.iter().cloned().map(TablePartition::List).collect();
                if l.default_enabled {
                    partitions.push(TablePartition::Default);
                }
                partitions
            }
            Partitioning::Range(r) => r.ranges.iter().cloned().map(TablePartition::Range).collect(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_partitions_carry_modulus_and_remainder() {
        let partitioning = Partitioning::hash(&["role"], &["one", "two", "three"]);
        let partitions = partitioning.partitions();
        assert_eq!(partitions.len(), 3);
        assert_eq!(
            partitions[1],
            TablePartition::Hash {
                suffix: "two".into(),
                modulus: 3,
                remainder: 1
            }
        );
    }

    #[test]
    fn test_list_default_partition() {
        let partitioning = Partitioning::list(
            &["role"],
            vec![ListPartition::new("admin", vec!["'admin'".into()])],
        )
        .with_default_partition();

        let partitions = partitioning.partitions();
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[1].suffix(), "default");
    }

    #[test]
    fn test_list_values_compare_as_sets() {
        let a = TablePartition::List(ListPartition::new("p", vec!["'a'".into(), "'b'".into()]));
        let b = TablePartition::List(ListPartition::new("P", vec!["'b'".into(), "'a'".into()]));
        assert!(a.matches(&b));
    }

    #[test]
    fn test_list_values_are_case_sensitive() {
        let a = TablePartition::List(ListPartition::new("p", vec!["'abc'".into()]));
        let b = TablePartition::List(ListPartition::new("p", vec!["'ABC'".into()]));
        let padded = TablePartition::List(ListPartition::new("p", vec![" 'abc' ".into()]));
        assert!(!a.matches(&b));
        assert!(a.matches(&padded));
    }

    #[test]
    fn test_strategy() {
        assert_eq!(Partitioning::None.strategy(), PartitionStrategy::None);
        assert!(!Partitioning::None.is_partitioned());
        let range = Partitioning::range(&["day"], vec![RangePartition::new("2024", "'2024-01-01'", "'2025-01-01'")]);
        assert_eq!(range.strategy(), PartitionStrategy::Range);
        assert_eq!(range.columns(), &["day".to_string()]);
    }
}
