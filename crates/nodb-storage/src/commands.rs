use async_trait::async_trait;
use nodb_core::{StoreError, StoreResult, UpdateMode};
use std::sync::Arc;
use tokio::fs;
use tokio_util::sync::CancellationToken;

use crate::files;
use crate::keys::ensure_provided;
use crate::traits::{
    ensure_not_cancelled, BasicCommands, CreateCommand, StoragePathResolver, StringSerializer,
};

/// Local filesystem commands
///
/// Writes are atomic per file. There is no locking between callers: concurrent updates
/// to the same key race, and the filesystem decides the winner. Concurrent creates of
/// the same key never overwrite each other; all but one fail with
/// [`StoreError::AlreadyExists`].
pub struct LocalCommands<T>
where
    T: Send + Sync + 'static,
{
    path_resolver: Arc<dyn StoragePathResolver<T>>,
    serializer: Arc<dyn StringSerializer<T>>,
    update_mode: UpdateMode,
}

impl<T> LocalCommands<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(
        path_resolver: Arc<dyn StoragePathResolver<T>>,
        serializer: Arc<dyn StringSerializer<T>>,
    ) -> Self {
        Self {
            path_resolver,
            serializer,
            update_mode: UpdateMode::default(),
        }
    }

    pub fn with_update_mode(mut self, update_mode: UpdateMode) -> Self {
        self.update_mode = update_mode;
        self
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }
}

#[async_trait]
impl<T> CreateCommand<T> for LocalCommands<T>
where
    T: Send + Sync + 'static,
{
    async fn create(
        &self,
        project_id: &str,
        key: &str,
        obj: &T,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        ensure_provided("projectId", project_id)?;
        ensure_provided("key", key)?;
        ensure_not_cancelled(cancel)?;

        let start = std::time::Instant::now();
        let path = self
            .path_resolver
            .resolve_for_write(
                project_id,
                key,
                Some(obj),
                self.serializer.expected_file_extension(),
                true,
            )
            .await?;

        if fs::try_exists(&path).await? {
            return Err(StoreError::AlreadyExists(format!(
                "can't create file that already exists: {}",
                path.display()
            )));
        }

        let serialized = self.serializer.serialize(obj)?;
        files::write_new(&path, serialized.as_bytes()).await?;

        tracing::info!(
            project_id = %project_id,
            key = %key,
            path = %path.display(),
            size_bytes = serialized.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "NoDb create successful"
        );

        Ok(())
    }
}

#[async_trait]
impl<T> BasicCommands<T> for LocalCommands<T>
where
    T: Send + Sync + 'static,
{
    async fn update(
        &self,
        project_id: &str,
        key: &str,
        obj: &T,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        ensure_provided("projectId", project_id)?;
        ensure_provided("key", key)?;
        ensure_not_cancelled(cancel)?;

        let start = std::time::Instant::now();
        let path = self
            .path_resolver
            .resolve_for_write(
                project_id,
                key,
                Some(obj),
                self.serializer.expected_file_extension(),
                false,
            )
            .await?;

        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(format!(
                "can't update file that doesn't exist: {}",
                path.display()
            )));
        }

        let serialized = self.serializer.serialize(obj)?;

        match self.update_mode {
            UpdateMode::Replace => {}
            UpdateMode::DeleteThenWrite => fs::remove_file(&path).await?,
        }
        files::write_atomic(&path, serialized.as_bytes()).await?;

        tracing::info!(
            project_id = %project_id,
            key = %key,
            path = %path.display(),
            size_bytes = serialized.len(),
            update_mode = %self.update_mode,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "NoDb update successful"
        );

        Ok(())
    }

    async fn delete(
        &self,
        project_id: &str,
        key: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        ensure_provided("projectId", project_id)?;
        ensure_provided("key", key)?;
        ensure_not_cancelled(cancel)?;

        let start = std::time::Instant::now();
        let path = self
            .path_resolver
            .resolve_for_read(project_id, key, self.serializer.expected_file_extension())
            .await?;

        let not_found = || {
            StoreError::NotFound(format!(
                "can't delete item that does not exist: {}",
                path.display()
            ))
        };

        if !fs::try_exists(&path).await? {
            return Err(not_found());
        }

        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => not_found(),
            _ => StoreError::Io(e),
        })?;

        tracing::info!(
            project_id = %project_id,
            key = %key,
            path = %path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "NoDb delete successful"
        );

        Ok(())
    }
}
