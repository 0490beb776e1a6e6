//! Per-database feature cache and in-process schema lock.

use std::time::Duration;

use dashmap::DashSet;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::feature::feature_key;

/// Feature identities already verified against the database.
#[derive(Debug, Default)]
pub struct FeatureCache {
    verified: DashSet<String>,
}

impl FeatureCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the feature has been verified.
    pub fn contains(&self, feature: &str) -> bool {
        self.verified.contains(&feature_key(feature))
    }

    /// Record a verified feature.
    pub fn mark(&self, feature: &str) {
        self.verified.insert(feature_key(feature));
    }

    /// Forget every verified feature.
    pub fn clear(&self) {
        self.verified.clear();
    }

    /// Number of verified features.
    pub fn len(&self) -> usize {
        self.verified.len()
    }

    /// Whether nothing has been verified.
    pub fn is_empty(&self) -> bool {
        self.verified.is_empty()
    }
}

/// Serializes ensure calls within one process, with a bounded wait.
#[derive(Debug)]
pub struct LocalLock {
    mutex: Mutex<()>,
    timeout: Duration,
}

impl LocalLock {
    /// Create a lock that gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            mutex: Mutex::new(()),
            timeout,
        }
    }

    /// Configured wait timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for the lock on behalf of `feature`.
    pub async fn acquire(&self, feature: &str) -> Result<MutexGuard<'_, ()>> {
        tokio::time::timeout(self.timeout, self.mutex.lock())
            .await
            .map_err(|_| Error::LocalLockTimeout {
                feature: feature.to_string(),
                timeout: self.timeout,
            })
    }
}
