//! Store abstraction traits
//!
//! Path resolution and serialization are the two pluggable seams. Commands and queries
//! are split the same way so that one-way consumers (the data migrator only needs
//! `get_all` on one side and `create` on the other) can depend on the narrow traits.

use async_trait::async_trait;
use nodb_core::{LifecycleState, StoreError, StoreResult};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Maps a tenant, key and (optionally) an object to a location on disk.
///
/// Resolvers never check whether the target file exists; callers do. The same
/// `(project_id, key, file_extension)` must resolve to the same location for reads
/// and writes.
#[async_trait]
pub trait StoragePathResolver<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Location for a write. `obj` lets a resolver shard by object attributes.
    ///
    /// When `ensure_folders_exist` is set, all ancestor directories are created.
    /// Creation is idempotent and tolerates concurrent creators.
    async fn resolve_for_write(
        &self,
        project_id: &str,
        key: &str,
        obj: Option<&T>,
        file_extension: &str,
        ensure_folders_exist: bool,
    ) -> StoreResult<PathBuf>;

    /// Location for a read or delete, when only the key is known. Creates nothing.
    async fn resolve_for_read(
        &self,
        project_id: &str,
        key: &str,
        file_extension: &str,
    ) -> StoreResult<PathBuf>;

    /// Folder holding every object of this type for the tenant.
    async fn resolve_project_root(&self, project_id: &str) -> StoreResult<PathBuf>;
}

/// Converts objects to and from their persisted text form.
pub trait StringSerializer<T>: Send + Sync {
    /// Extension of every file this serializer writes, including the leading dot.
    fn expected_file_extension(&self) -> &str;

    fn serialize(&self, obj: &T) -> StoreResult<String>;

    /// Decode a payload, reporting why it could not be read.
    fn try_deserialize(&self, payload: &str, key: &str) -> StoreResult<T>;

    /// Decode a payload, returning `None` for anything malformed.
    fn deserialize(&self, payload: &str, key: &str) -> Option<T> {
        match self.try_deserialize(payload, key) {
            Ok(obj) => Some(obj),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to deserialize payload");
                None
            }
        }
    }
}

#[async_trait]
pub trait CreateCommand<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Persist a new object. Fails with `AlreadyExists` if the location is occupied.
    async fn create(
        &self,
        project_id: &str,
        key: &str,
        obj: &T,
        cancel: &CancellationToken,
    ) -> StoreResult<()>;
}

#[async_trait]
pub trait BasicCommands<T>: CreateCommand<T>
where
    T: Send + Sync + 'static,
{
    /// Replace an existing object. Fails with `NotFound` if there is none.
    async fn update(
        &self,
        project_id: &str,
        key: &str,
        obj: &T,
        cancel: &CancellationToken,
    ) -> StoreResult<()>;

    /// Remove an existing object. Fails with `NotFound` if there is none.
    async fn delete(&self, project_id: &str, key: &str, cancel: &CancellationToken)
        -> StoreResult<()>;
}

#[async_trait]
pub trait GetAllQuery<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Every readable object for the tenant, in no particular order.
    ///
    /// Files that fail to deserialize are skipped, not reported as errors.
    async fn get_all(&self, project_id: &str, cancel: &CancellationToken) -> StoreResult<Vec<T>>;
}

#[async_trait]
pub trait BasicQueries<T>: GetAllQuery<T>
where
    T: Send + Sync + 'static,
{
    /// `None` if the object is missing or unreadable.
    async fn fetch(
        &self,
        project_id: &str,
        key: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<T>>;

    /// Number of objects directly under the tenant folder (not recursive).
    async fn count(&self, project_id: &str, cancel: &CancellationToken) -> StoreResult<usize>;

    /// Tear the store down; every later query fails with `Disposed`.
    fn dispose(&self);

    fn lifecycle_state(&self) -> LifecycleState;
}

/// Fail fast when the caller already gave up.
pub(crate) fn ensure_not_cancelled(cancel: &CancellationToken) -> StoreResult<()> {
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    Ok(())
}
