//! Bulk data migration between stores
//!
//! Reads every object of a source tenant and creates it under a destination tenant,
//! one item at a time. This is a best-effort batch, not a transaction: with
//! `continue_after_error` set, a run can finish with some keys created and others not.
//!
//! Migration is not idempotent. Re-running it re-attempts every item, and items that
//! already exist at the destination fail with `AlreadyExists`.

use nodb_core::{StoreError, StoreErrorKind};
use nodb_storage::{CreateCommand, GetAllQuery};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Derives the storage key of a loaded object.
pub trait KeyResolver<T>: Send + Sync {
    fn key(&self, obj: &T) -> String;
}

impl<T, F> KeyResolver<T> for F
where
    F: Fn(&T) -> String + Send + Sync,
{
    fn key(&self, obj: &T) -> String {
        self(obj)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataMigratorOptions {
    /// Keep going after a per-item failure instead of aborting the run.
    pub continue_after_error: bool,
}

/// Result of migrating a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Migrated {
        key: String,
    },
    Failed {
        key: String,
        kind: StoreErrorKind,
        message: String,
    },
}

impl ItemOutcome {
    pub fn key(&self) -> &str {
        match self {
            ItemOutcome::Migrated { key } | ItemOutcome::Failed { key, .. } => key,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }
}

/// Per-item outcomes of a completed migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub source_project_id: String,
    pub destination_project_id: String,
    pub outcomes: Vec<ItemOutcome>,
}

impl MigrationReport {
    fn new(source_project_id: &str, destination_project_id: &str) -> Self {
        Self {
            source_project_id: source_project_id.to_string(),
            destination_project_id: destination_project_id.to_string(),
            outcomes: Vec::new(),
        }
    }

    pub fn had_errors(&self) -> bool {
        self.outcomes.iter().any(ItemOutcome::is_failure)
    }

    pub fn migrated_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Failed to list source project {project_id}: {source}")]
    Source {
        project_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to migrate item {key}: {source}")]
    ItemFailed {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Migration cancelled after {migrated} items")]
    Cancelled { migrated: usize },
}

pub struct DataMigrator<T>
where
    T: Send + Sync + 'static,
{
    key_resolver: Arc<dyn KeyResolver<T>>,
    source_query: Arc<dyn GetAllQuery<T>>,
    target_command: Arc<dyn CreateCommand<T>>,
    options: DataMigratorOptions,
    cancel: CancellationToken,
}

impl<T> DataMigrator<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(
        key_resolver: Arc<dyn KeyResolver<T>>,
        source_query: Arc<dyn GetAllQuery<T>>,
        target_command: Arc<dyn CreateCommand<T>>,
    ) -> Self {
        Self {
            key_resolver,
            source_query,
            target_command,
            options: DataMigratorOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: DataMigratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Stop the run between items once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> DataMigratorOptions {
        self.options
    }

    /// Migrate and report only whether every item made it across.
    pub async fn migrate_data(
        &self,
        source_project_id: &str,
        destination_project_id: &str,
    ) -> Result<bool, MigrationError> {
        let report = self
            .migrate(source_project_id, destination_project_id)
            .await?;
        Ok(!report.had_errors())
    }

    /// Migrate every item, returning the outcome of each one.
    ///
    /// Without `continue_after_error` the first failure is returned and the remaining
    /// items are not attempted.
    #[tracing::instrument(
        skip(self),
        fields(continue_after_error = self.options.continue_after_error)
    )]
    pub async fn migrate(
        &self,
        source_project_id: &str,
        destination_project_id: &str,
    ) -> Result<MigrationReport, MigrationError> {
        let start = std::time::Instant::now();
        let items = self
            .source_query
            .get_all(source_project_id, &self.cancel)
            .await
            .map_err(|source| MigrationError::Source {
                project_id: source_project_id.to_string(),
                source,
            })?;

        let mut report = MigrationReport::new(source_project_id, destination_project_id);

        for obj in &items {
            if self.cancel.is_cancelled() {
                return Err(MigrationError::Cancelled {
                    migrated: report.migrated_count(),
                });
            }

            let key = self.key_resolver.key(obj);
            match self
                .target_command
                .create(destination_project_id, &key, obj, &self.cancel)
                .await
            {
                Ok(()) => report.outcomes.push(ItemOutcome::Migrated { key }),
                Err(e) if self.options.continue_after_error => {
                    tracing::error!(
                        key = %key,
                        error = %e,
                        "Migration item failed; continuing"
                    );
                    report.outcomes.push(ItemOutcome::Failed {
                        key,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Migration item failed; aborting");
                    return Err(MigrationError::ItemFailed { key, source: e });
                }
            }
        }

        tracing::info!(
            total = items.len(),
            migrated = report.migrated_count(),
            failed = report.failed_count(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Migration finished"
        );

        Ok(report)
    }
}
