//! Partitioning comparison.

use crate::model::{same_names, Partitioning, TablePartition};

/// How a table's partitioning has to change.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionDelta {
    /// Partitioning matches.
    None,
    /// Only new partitions are needed.
    Additive(Vec<TablePartition>),
    /// The table has to be rebuilt with the new layout.
    Rebuild,
}

impl PartitionDelta {
    /// Classify the change from `actual` to `expected`.
    ///
    /// Rules apply in order: a strategy change or a partition-column change
    /// rebuilds; any change to a hash suffix list rebuilds; for list and
    /// range, a live partition missing or changed in the declaration
    /// rebuilds, as does toggling the list default partition; otherwise new
    /// partitions are additive.
    pub fn compute(expected: &Partitioning, actual: &Partitioning) -> Self {
        if expected.strategy() != actual.strategy() {
            return PartitionDelta::Rebuild;
        }

        if !same_names(expected.columns(), actual.columns()) {
            return PartitionDelta::Rebuild;
        }

        match (expected, actual) {
            (Partitioning::None, Partitioning::None) => PartitionDelta::None,
            (Partitioning::Hash(e), Partitioning::Hash(a)) => {
                if same_names(&e.suffixes, &a.suffixes) {
                    PartitionDelta::None
                } else {
                    PartitionDelta::Rebuild
                }
            }
            (Partitioning::List(e), Partitioning::List(a)) => {
                if e.default_enabled != a.default_enabled {
                    PartitionDelta::Rebuild
                } else {
                    compare_partition_sets(expected.partitions(), actual.partitions())
                }
            }
            (Partitioning::Range(_), Partitioning::Range(_)) => {
                compare_partition_sets(expected.partitions(), actual.partitions())
            }
            _ => PartitionDelta::Rebuild,
        }
    }

    /// Whether anything has to change.
    pub fn has_changes(&self) -> bool {
        !matches!(self, PartitionDelta::None)
    }
}

fn compare_partition_sets(expected: Vec<TablePartition>, actual: Vec<TablePartition>) -> PartitionDelta {
    if actual.iter().any(|a| !expected.iter().any(|e| e.matches(a))) {
        return PartitionDelta::Rebuild;
    }

    let added: Vec<TablePartition> = expected
        .into_iter()
        .filter(|e| !actual.iter().any(|a| a.matches(e)))
        .collect();

    if added.is_empty() {
        PartitionDelta::None
    } else {
        PartitionDelta::Additive(added)
    }
}
