//! The apply orchestrator for one target database.
//!
//! A [`Database`] owns the registered features, the provider for its
//! engine and a connection factory. It computes migrations from a single
//! probe snapshot, gates them by policy, and applies them either in bulk
//! under the global lock or feature by feature under the in-process lock.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::cache::{FeatureCache, LocalLock};
use crate::config::MigrationConfig;
use crate::connection::{Connection, ConnectionFactory};
use crate::delta::Difference;
use crate::error::{Error, Result};
use crate::feature::{Feature, FeatureRegistry};
use crate::lock::GlobalLock;
use crate::logger::{DefaultMigrationLogger, MigrationLogger};
use crate::migration::{rollback_file_path, AutoCreate, SchemaMigration};
use crate::model::SchemaObject;
use crate::probe::{ProbeBuilder, ProbeResult};
use crate::provider::{Fragment, Provider};
use crate::writer::{CopyPage, CopyRows, DdlStatement, DdlWriter};

/// Result of a bulk apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Worst difference found under the lock.
    pub difference: Difference,
    /// Statements sent to the engine and accepted.
    pub statements_executed: usize,
    /// Reconnections needed to take the global lock.
    pub reconnections: u32,
}

impl ApplyOutcome {
    fn unchanged(difference: Difference) -> Self {
        Self {
            difference,
            statements_executed: 0,
            reconnections: 0,
        }
    }
}

/// A target database and the features declared for it.
pub struct Database {
    identifier: String,
    provider: Arc<dyn Provider>,
    factory: Arc<dyn ConnectionFactory>,
    registry: FeatureRegistry,
    config: MigrationConfig,
    cache: FeatureCache,
    local_lock: LocalLock,
    logger: Arc<dyn MigrationLogger>,
}

impl Database {
    /// Create a database handle with the default configuration.
    pub fn new(
        identifier: impl Into<String>,
        provider: Arc<dyn Provider>,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Self {
        let config = MigrationConfig::default();
        Self {
            identifier: identifier.into(),
            provider,
            factory,
            registry: FeatureRegistry::new(),
            local_lock: LocalLock::new(config.local_lock_timeout()),
            config,
            cache: FeatureCache::new(),
            logger: Arc::new(DefaultMigrationLogger),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: MigrationConfig) -> Self {
        self.local_lock = LocalLock::new(config.local_lock_timeout());
        self.config = config;
        self
    }

    /// Replace the statement logger.
    pub fn with_logger(mut self, logger: Arc<dyn MigrationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Register a feature.
    pub fn with_feature(mut self, feature: impl Feature + 'static) -> Self {
        self.register(Arc::new(feature));
        self
    }

    /// Register a feature, replacing one with the same identity.
    pub fn register(&mut self, feature: Arc<dyn Feature>) {
        self.registry.register(feature);
    }

    /// Database identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Engine provider.
    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// Active configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Registered features.
    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    /// Features verified so far.
    pub fn cache(&self) -> &FeatureCache {
        &self.cache
    }

    /// Forget every verified feature.
    pub fn reset_cache(&self) {
        self.cache.clear();
    }

    /// Migration for every registered object.
    #[instrument(skip(self), fields(database = %self.identifier))]
    pub async fn create_migration(&self) -> Result<SchemaMigration> {
        let objects = self.registry.all_objects(self.config.cycle_behavior)?;
        self.compute(&objects).await
    }

    /// Migration for the objects of one feature.
    #[instrument(skip(self), fields(database = %self.identifier))]
    pub async fn create_migration_for(&self, feature: &str) -> Result<SchemaMigration> {
        let objects = self.registry.get(feature)?.objects();
        self.compute(&objects).await
    }

    /// Apply every registered feature under the global lock.
    ///
    /// The migration is computed and gated once without the lock so that a
    /// policy violation surfaces early, then recomputed and gated again on
    /// the locked connection before any DDL runs. Under
    /// [`AutoCreate::None`] nothing is locked or applied.
    #[instrument(skip(self), fields(database = %self.identifier))]
    pub async fn apply_all_configured_changes(
        &self,
        policy: Option<AutoCreate>,
    ) -> Result<ApplyOutcome> {
        let policy = policy.unwrap_or(self.config.auto_create);
        let features = self.registry.resolve_all(self.config.cycle_behavior)?;
        let objects: Vec<Arc<dyn SchemaObject>> =
            features.iter().flat_map(|f| f.objects()).collect();

        let precheck = self.compute(&objects).await?;
        precheck.assert_patching_is_valid(policy)?;
        if policy == AutoCreate::None {
            info!(difference = %precheck.difference(), "auto-create disabled, nothing applied");
            return Ok(ApplyOutcome::unchanged(precheck.difference()));
        }

        let lock_id = self.config.lock_id_for(&self.identifier);
        let mut lock = GlobalLock::attain(
            self.factory.as_ref(),
            &self.identifier,
            lock_id,
            &self.config.reconnection,
        )
        .await?;
        let reconnections = lock.reconnections();

        let applied = self.apply_locked(lock.connection(), &objects, policy).await;
        let released = lock.release().await;
        let (difference, statements_executed) = applied?;
        released?;

        for feature in &features {
            self.cache.mark(feature.identifier());
        }
        info!(
            difference = %difference,
            statements = statements_executed,
            reconnections,
            "applied configured changes"
        );

        Ok(ApplyOutcome {
            difference,
            statements_executed,
            reconnections,
        })
    }

    async fn apply_locked(
        &self,
        connection: &mut dyn Connection,
        objects: &[Arc<dyn SchemaObject>],
        policy: AutoCreate,
    ) -> Result<(Difference, usize)> {
        let migration = self.determine(connection, objects).await?;
        migration.assert_patching_is_valid(policy)?;
        if !migration.has_changes() {
            debug!("no changes detected under the lock");
            return Ok((Difference::None, 0));
        }
        let executed = self.execute_migration(connection, &migration).await?;
        Ok((migration.difference(), executed))
    }

    /// Make sure a feature and its dependencies exist, applying what is
    /// missing under the configured policy. Each feature is reconciled at
    /// most once until the cache is reset.
    #[instrument(skip(self), fields(database = %self.identifier))]
    pub async fn ensure_storage_exists(&self, feature: &str) -> Result<()> {
        if self.cache.contains(feature) {
            return Ok(());
        }

        let _guard = self.local_lock.acquire(feature).await?;
        if self.cache.contains(feature) {
            return Ok(());
        }

        let features = self.registry.resolve(feature, self.config.cycle_behavior)?;
        if self.config.auto_create == AutoCreate::None {
            for f in &features {
                self.cache.mark(f.identifier());
            }
            return Ok(());
        }

        let mut connection = self.factory.open().await?;
        let ensured = self.ensure_features(connection.as_mut(), &features).await;
        let closed = connection.close().await;
        ensured?;
        closed
    }

    async fn ensure_features(
        &self,
        connection: &mut dyn Connection,
        features: &[Arc<dyn Feature>],
    ) -> Result<()> {
        for feature in features {
            if self.cache.contains(feature.identifier()) {
                continue;
            }

            let objects = feature.objects();
            let migration = self.determine(connection, &objects).await?;
            if migration.has_changes() {
                migration.assert_patching_is_valid(self.config.auto_create)?;
                let executed = self.execute_migration(connection, &migration).await?;
                info!(
                    feature = feature.identifier(),
                    difference = %migration.difference(),
                    statements = executed,
                    "ensured feature storage"
                );
            }
            self.cache.mark(feature.identifier());
        }
        Ok(())
    }

    /// Fail with the missing DDL unless the database matches every
    /// registered object.
    #[instrument(skip(self), fields(database = %self.identifier))]
    pub async fn assert_database_matches_configuration(&self) -> Result<()> {
        let migration = self.create_migration().await?;
        if migration.has_changes() {
            return Err(Error::ConfigurationMismatch {
                database: self.identifier.clone(),
                ddl: migration.update_script(self.provider.as_ref()),
            });
        }
        Ok(())
    }

    /// Write the pending migration to `path` and its rollback next to it.
    #[instrument(skip(self), fields(database = %self.identifier))]
    pub async fn write_migration_file(&self, path: &Path, policy: Option<AutoCreate>) -> Result<()> {
        let policy = policy.unwrap_or(self.config.auto_create);
        let migration = self.create_migration().await?;
        migration.assert_patching_is_valid(policy)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let rollback_path = rollback_file_path(path);
        tokio::fs::write(path, migration.update_script(self.provider.as_ref())).await?;
        tokio::fs::write(&rollback_path, migration.rollback_script(self.provider.as_ref())).await?;

        info!(
            path = %path.display(),
            rollback = %rollback_path.display(),
            difference = %migration.difference(),
            "wrote migration files"
        );
        Ok(())
    }

    /// Creation script for every registered object, schemas first.
    pub fn to_database_script(&self) -> Result<String> {
        let provider = self.provider.as_ref();
        let objects = self.registry.all_objects(self.config.cycle_behavior)?;
        let schemas: BTreeSet<&str> = objects
            .iter()
            .map(|o| o.identifier().schema.as_str())
            .collect();

        let mut writer = DdlWriter::new();
        for schema in schemas {
            writer.write(provider.render(&Fragment::CreateSchema { schema }));
        }
        for object in &objects {
            object.write_create(provider, &mut writer);
        }
        Ok(writer.to_script(provider))
    }

    async fn compute(&self, objects: &[Arc<dyn SchemaObject>]) -> Result<SchemaMigration> {
        let mut connection = self.factory.open().await?;
        let determined = self.determine(connection.as_mut(), objects).await;
        let closed = connection.close().await;
        let migration = determined?;
        closed?;
        Ok(migration)
    }

    async fn determine(
        &self,
        connection: &mut dyn Connection,
        objects: &[Arc<dyn SchemaObject>],
    ) -> Result<SchemaMigration> {
        let provider = self.provider.as_ref();
        let mut builder = ProbeBuilder::new();
        for object in objects {
            object.configure_probe(provider, &mut builder);
        }

        let batch = builder.build();
        let actual = if batch.is_empty() {
            Vec::new()
        } else {
            connection.probe(&batch).await?
        };
        debug!(requested = batch.len(), found = actual.len(), "probed live objects");

        let probe = ProbeResult::new(provider.capabilities(), actual);
        SchemaMigration::determine(objects, &probe)
    }

    async fn execute_migration(
        &self,
        connection: &mut dyn Connection,
        migration: &SchemaMigration,
    ) -> Result<usize> {
        let mut writer = DdlWriter::new();
        migration.write_all_updates(self.provider.as_ref(), &mut writer);

        let mut executed = 0;
        for statement in writer.into_statements() {
            match statement {
                DdlStatement::Sql(sql) => {
                    if self.execute_statement(connection, &sql).await?.is_some() {
                        executed += 1;
                    }
                }
                DdlStatement::CopyRows(copy) => {
                    executed += self.copy_rows(connection, &copy).await?;
                }
                DdlStatement::Comment(text) => debug!(comment = %text, "migration note"),
            }
        }
        Ok(executed)
    }

    /// Run one statement through the logger. `None` means the logger chose
    /// to skip a failure.
    async fn execute_statement(
        &self,
        connection: &mut dyn Connection,
        sql: &str,
    ) -> Result<Option<u64>> {
        self.logger.on_schema_change(sql);
        match connection.execute(sql).await {
            Ok(rows) => Ok(Some(rows)),
            Err(e) => {
                self.logger.on_failure(sql, e)?;
                Ok(None)
            }
        }
    }

    /// Copy rows one page at a time until a page comes back short.
    ///
    /// A failed page aborts the migration whatever the logger decides: the
    /// statements after the copy retire and drop the live table.
    async fn copy_rows(&self, connection: &mut dyn Connection, copy: &CopyRows) -> Result<usize> {
        let limit = self.config.copy_batch_size.max(1);
        let mut page = CopyPage { offset: 0, limit };
        let mut pages = 0;

        loop {
            let sql = self.provider.render(&Fragment::CopyRows {
                copy,
                page: Some(page),
            });
            self.logger.on_schema_change(&sql);
            let rows = connection.execute(&sql).await.map_err(|e| {
                error!(
                    source = %copy.source.qualified_name(),
                    error = %e,
                    "row copy failed, aborting rebuild"
                );
                e
            })?;
            pages += 1;
            if rows < limit {
                break;
            }
            page.offset += limit;
        }

        debug!(
            source = %copy.source.qualified_name(),
            target = %copy.target.qualified_name(),
            pages,
            "copied rows"
        );
        Ok(pages)
    }
}
