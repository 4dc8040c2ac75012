use async_trait::async_trait;
use nodb_core::{Lifecycle, LifecycleState, StoreError, StoreResult};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio_util::sync::CancellationToken;

use crate::files;
use crate::keys::{ensure_provided, key_from_file_name};
use crate::traits::{
    ensure_not_cancelled, BasicQueries, GetAllQuery, StoragePathResolver, StringSerializer,
};

/// Local filesystem queries
///
/// Holds an explicit lifecycle: after [`BasicQueries::dispose`] every query fails with
/// [`StoreError::Disposed`].
pub struct LocalQueries<T>
where
    T: Send + Sync + 'static,
{
    path_resolver: Arc<dyn StoragePathResolver<T>>,
    serializer: Arc<dyn StringSerializer<T>>,
    lifecycle: Lifecycle,
}

impl<T> LocalQueries<T>
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
            lifecycle: Lifecycle::new(),
        }
    }

    fn ensure_active(&self) -> StoreResult<()> {
        if self.lifecycle.is_disposed() {
            return Err(StoreError::Disposed("LocalQueries".to_string()));
        }
        Ok(())
    }

    /// Read and decode one file. `None` when the file is gone, or its payload is not
    /// valid text or not a `T`.
    async fn load_object(&self, path: &Path, key: &str) -> StoreResult<Option<T>> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), key = %key, "Stored file vanished before read");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let payload = match String::from_utf8(bytes) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    key = %key,
                    error = %e,
                    "Stored payload is not valid UTF-8"
                );
                return Ok(None);
            }
        };
        Ok(self.serializer.deserialize(&payload, key))
    }
}

#[async_trait]
impl<T> GetAllQuery<T> for LocalQueries<T>
where
    T: Send + Sync + 'static,
{
    async fn get_all(&self, project_id: &str, cancel: &CancellationToken) -> StoreResult<Vec<T>> {
        ensure_provided("projectId", project_id)?;
        ensure_not_cancelled(cancel)?;
        self.ensure_active()?;

        let start = std::time::Instant::now();
        let root = self.path_resolver.resolve_project_root(project_id).await?;
        if !fs::try_exists(&root).await? {
            return Ok(Vec::new());
        }

        let extension = self.serializer.expected_file_extension().to_string();
        let paths = files::list_files(root.clone(), extension.clone()).await?;

        let mut items = Vec::with_capacity(paths.len());
        let mut skipped = 0usize;
        for path in paths {
            ensure_not_cancelled(cancel)?;

            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            let Some(key) = key_from_file_name(file_name, &extension) else {
                continue;
            };

            match self.load_object(&path, key).await? {
                Some(obj) => items.push(obj),
                None => {
                    skipped += 1;
                    tracing::warn!(
                        path = %path.display(),
                        key = %key,
                        "failed to load file, result was empty; skipping"
                    );
                }
            }
        }

        tracing::debug!(
            project_id = %project_id,
            root = %root.display(),
            loaded = items.len(),
            skipped,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "NoDb get_all complete"
        );

        Ok(items)
    }
}

#[async_trait]
impl<T> BasicQueries<T> for LocalQueries<T>
where
    T: Send + Sync + 'static,
{
    async fn fetch(
        &self,
        project_id: &str,
        key: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<T>> {
        ensure_provided("projectId", project_id)?;
        ensure_provided("key", key)?;
        ensure_not_cancelled(cancel)?;
        self.ensure_active()?;

        let path = self
            .path_resolver
            .resolve_for_read(project_id, key, self.serializer.expected_file_extension())
            .await?;

        if !fs::try_exists(&path).await? {
            tracing::debug!(project_id = %project_id, key = %key, "NoDb fetch: not found");
            return Ok(None);
        }

        let obj = self.load_object(&path, key).await?;
        tracing::debug!(
            project_id = %project_id,
            key = %key,
            path = %path.display(),
            found = obj.is_some(),
            "NoDb fetch complete"
        );
        Ok(obj)
    }

    async fn count(&self, project_id: &str, cancel: &CancellationToken) -> StoreResult<usize> {
        ensure_provided("projectId", project_id)?;
        ensure_not_cancelled(cancel)?;
        self.ensure_active()?;

        let root = self.path_resolver.resolve_project_root(project_id).await?;
        if !fs::try_exists(&root).await? {
            return Ok(0);
        }

        let extension = self.serializer.expected_file_extension();
        let mut entries = fs::read_dir(&root).await?;
        let mut count = 0usize;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if file_name
                .to_str()
                .and_then(|name| key_from_file_name(name, extension))
                .is_some()
            {
                count += 1;
            }
        }

        tracing::debug!(project_id = %project_id, root = %root.display(), count, "NoDb count complete");
        Ok(count)
    }

    fn dispose(&self) {
        self.lifecycle.dispose();
    }

    fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }
}
