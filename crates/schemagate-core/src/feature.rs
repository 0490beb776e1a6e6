//! Features: named groups of schema objects with dependencies.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::SchemaObject;

/// Normalized form of a feature identity. Every identity comparison goes
/// through this, in the registry and in the verified-feature cache alike.
pub fn feature_key(identifier: &str) -> String {
    identifier.to_lowercase()
}

/// A named group of schema objects managed together.
pub trait Feature: Send + Sync + fmt::Debug {
    /// Identity of the feature. Compared case-insensitively.
    fn identifier(&self) -> &str;

    /// Declared objects, in creation order.
    fn objects(&self) -> Vec<Arc<dyn SchemaObject>>;

    /// Identities of features that must exist first.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A feature assembled from values.
#[derive(Debug, Clone)]
pub struct SchemaFeature {
    identifier: String,
    objects: Vec<Arc<dyn SchemaObject>>,
    dependencies: Vec<String>,
}

impl SchemaFeature {
    /// Create an empty feature.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            objects: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Add a declared object.
    pub fn with_object(mut self, object: impl SchemaObject + 'static) -> Self {
        self.objects.push(Arc::new(object));
        self
    }

    /// Add a dependency.
    pub fn depends_on(mut self, feature: impl Into<String>) -> Self {
        self.dependencies.push(feature.into());
        self
    }
}

impl Feature for SchemaFeature {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn objects(&self) -> Vec<Arc<dyn SchemaObject>> {
        self.objects.clone()
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }
}

/// What to do when a dependency chain leads back to a feature in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CycleBehavior {
    /// Warn and skip the revisit.
    #[default]
    Skip,
    /// Fail with [`Error::FeatureCycle`].
    Fail,
}

/// Registered features of one database, in registration order.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    features: Vec<Arc<dyn Feature>>,
}

impl FeatureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature, replacing one with the same identity.
    pub fn register(&mut self, feature: Arc<dyn Feature>) {
        let key = feature_key(feature.identifier());
        match self
            .features
            .iter()
            .position(|f| feature_key(f.identifier()) == key)
        {
            Some(index) => self.features[index] = feature,
            None => self.features.push(feature),
        }
    }

    /// Look up a feature.
    pub fn get(&self, identifier: &str) -> Result<Arc<dyn Feature>> {
        let key = feature_key(identifier);
        self.features
            .iter()
            .find(|f| feature_key(f.identifier()) == key)
            .cloned()
            .ok_or_else(|| Error::UnknownFeature {
                feature: identifier.to_string(),
            })
    }

    /// Registered features.
    pub fn features(&self) -> &[Arc<dyn Feature>] {
        &self.features
    }

    /// Number of registered features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The feature and everything it depends on, dependencies first.
    pub fn resolve(&self, identifier: &str, cycles: CycleBehavior) -> Result<Vec<Arc<dyn Feature>>> {
        let mut resolution = Resolution::new(self, cycles);
        resolution.visit(identifier)?;
        Ok(resolution.ordered)
    }

    /// Every registered feature, dependencies first.
    pub fn resolve_all(&self, cycles: CycleBehavior) -> Result<Vec<Arc<dyn Feature>>> {
        let mut resolution = Resolution::new(self, cycles);
        for feature in &self.features {
            resolution.visit(feature.identifier())?;
        }
        Ok(resolution.ordered)
    }

    /// Objects of every registered feature, dependencies first.
    pub fn all_objects(&self, cycles: CycleBehavior) -> Result<Vec<Arc<dyn SchemaObject>>> {
        Ok(self
            .resolve_all(cycles)?
            .iter()
            .flat_map(|f| f.objects())
            .collect())
    }
}

struct Resolution<'a> {
    registry: &'a FeatureRegistry,
    cycles: CycleBehavior,
    visited: HashSet<String>,
    stack: Vec<String>,
    ordered: Vec<Arc<dyn Feature>>,
}

impl<'a> Resolution<'a> {
    fn new(registry: &'a FeatureRegistry, cycles: CycleBehavior) -> Self {
        Self {
            registry,
            cycles,
            visited: HashSet::new(),
            stack: Vec::new(),
            ordered: Vec::new(),
        }
    }

    fn visit(&mut self, identifier: &str) -> Result<()> {
        let key = feature_key(identifier);
        if self.visited.contains(&key) {
            return Ok(());
        }

        if let Some(start) = self.stack.iter().position(|s| *s == key) {
            let mut path = self.stack[start..].to_vec();
            path.push(key);
            return match self.cycles {
                CycleBehavior::Fail => Err(Error::FeatureCycle { path }),
                CycleBehavior::Skip => {
                    warn!(cycle = %path.join(" -> "), "skipping cyclic feature dependency");
                    Ok(())
                }
            };
        }

        let feature = self.registry.get(identifier)?;
        self.stack.push(key.clone());
        for dependency in feature.dependencies() {
            self.visit(&dependency)?;
        }
        self.stack.pop();

        self.visited.insert(key);
        self.ordered.push(feature);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DbObjectName, Table};

    fn registry(features: Vec<SchemaFeature>) -> FeatureRegistry {
        let mut registry = FeatureRegistry::new();
        for feature in features {
            registry.register(Arc::new(feature));
        }
        registry
    }

    fn names(features: &[Arc<dyn Feature>]) -> Vec<&str> {
        features.iter().map(|f| f.identifier()).collect()
    }

    #[test]
    fn test_dependencies_resolve_first() {
        let registry = registry(vec![
            SchemaFeature::new("orders").depends_on("people").depends_on("products"),
            SchemaFeature::new("people"),
            SchemaFeature::new("products").depends_on("people"),
        ]);

        let resolved = registry.resolve("orders", CycleBehavior::Skip).unwrap();
        assert_eq!(names(&resolved), vec!["people", "products", "orders"]);

        let all = registry.resolve_all(CycleBehavior::Skip).unwrap();
        assert_eq!(names(&all), vec!["people", "products", "orders"]);
    }

    #[test]
    fn test_unknown_dependency() {
        let registry = registry(vec![SchemaFeature::new("orders").depends_on("billing")]);
        match registry.resolve("orders", CycleBehavior::Skip) {
            Err(Error::UnknownFeature { feature }) => assert_eq!(feature, "billing"),
            other => panic!("expected unknown feature, got {:?}", other.map(|f| f.len())),
        }
        assert!(registry.get("ORDERS").is_ok());
    }

    #[test]
    fn test_cycles_skip_or_fail() {
        let registry = registry(vec![
            SchemaFeature::new("a").depends_on("b"),
            SchemaFeature::new("b").depends_on("a"),
        ]);

        let resolved = registry.resolve("a", CycleBehavior::Skip).unwrap();
        assert_eq!(names(&resolved), vec!["b", "a"]);

        match registry.resolve("a", CycleBehavior::Fail) {
            Err(Error::FeatureCycle { path }) => assert_eq!(path, vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {:?}", other.map(|f| f.len())),
        }
    }

    #[test]
    fn test_register_replaces_same_identity() {
        let table = Table::new(DbObjectName::new("public", "people").unwrap());
        let registry = registry(vec![
            SchemaFeature::new("people"),
            SchemaFeature::new("People").with_object(table),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.all_objects(CycleBehavior::Skip).unwrap().len(), 1);
    }

    #[test]
    fn test_non_ascii_identity_matches_cache() {
        let registry = registry(vec![
            SchemaFeature::new("Größe"),
            SchemaFeature::new("Ärzte").depends_on("GRÖßE"),
        ]);
        assert_eq!(registry.get("ärzte").unwrap().identifier(), "Ärzte");
        assert_eq!(
            names(&registry.resolve("ÄRZTE", CycleBehavior::Fail).unwrap()),
            vec!["Größe", "Ärzte"]
        );

        let cache = crate::cache::FeatureCache::new();
        cache.mark(registry.get("ärzte").unwrap().identifier());
        assert!(cache.contains("ÄRZTE"));
        assert_eq!(feature_key("ÄRZTE"), feature_key("ärzte"));
    }
}
