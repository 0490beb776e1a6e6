//! Auto-create policy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delta::Difference;

/// How far an automatic apply may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AutoCreate {
    /// Never touch the database; the gate accepts everything because nothing runs.
    None,
    /// Only create missing objects.
    CreateOnly,
    /// Create missing objects and alter existing ones.
    #[default]
    CreateOrUpdate,
    /// Anything, including dropping and recreating invalid tables.
    All,
}

impl AutoCreate {
    /// Whether a delta of this severity may be applied under the policy.
    pub fn allows(&self, difference: Difference) -> bool {
        match self {
            AutoCreate::All | AutoCreate::None => true,
            AutoCreate::CreateOnly => matches!(difference, Difference::None | Difference::Create),
            AutoCreate::CreateOrUpdate => difference != Difference::Invalid,
        }
    }
}

impl fmt::Display for AutoCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoCreate::None => write!(f, "None"),
            AutoCreate::CreateOnly => write!(f, "CreateOnly"),
            AutoCreate::CreateOrUpdate => write!(f, "CreateOrUpdate"),
            AutoCreate::All => write!(f, "All"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DIFFERENCES: [Difference; 4] = [
        Difference::None,
        Difference::Create,
        Difference::Update,
        Difference::Invalid,
    ];

    #[test]
    fn test_permissive_policies_allow_everything() {
        for difference in ALL_DIFFERENCES {
            assert!(AutoCreate::All.allows(difference));
            assert!(AutoCreate::None.allows(difference));
        }
    }

    #[test]
    fn test_create_only() {
        assert!(AutoCreate::CreateOnly.allows(Difference::Create));
        assert!(!AutoCreate::CreateOnly.allows(Difference::Update));
        assert!(!AutoCreate::CreateOnly.allows(Difference::Invalid));
    }

    #[test]
    fn test_create_or_update() {
        assert!(AutoCreate::CreateOrUpdate.allows(Difference::Update));
        assert!(!AutoCreate::CreateOrUpdate.allows(Difference::Invalid));
    }

    #[test]
    fn test_default_and_display() {
        assert_eq!(AutoCreate::default(), AutoCreate::CreateOrUpdate);
        assert_eq!(AutoCreate::CreateOnly.to_string(), "CreateOnly");
    }
}
