//! Filesystem helpers shared by the resolvers, commands and queries.

use nodb_core::{StoreError, StoreResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;
use walkdir::WalkDir;

/// Prefix and suffix of in-flight write files. Neither matches a serializer extension,
/// and the name length does not depend on the target's name.
const TEMP_PREFIX: &str = ".nodb-";
const TEMP_SUFFIX: &str = ".tmp";

/// Write `data` to `path` so readers see either the old file or the complete new one.
///
/// The payload goes to a uniquely named sibling, is synced, and is then renamed onto
/// `path`. On failure the sibling is removed.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> StoreResult<()> {
    let temp_path = temp_path_for(path)?;
    let result = match write_synced(&temp_path, data).await {
        Ok(()) => fs::rename(&temp_path, path).await.map_err(StoreError::from),
        Err(e) => Err(e),
    };
    if result.is_err() {
        remove_temp(&temp_path).await;
    }
    result
}

/// Like [`write_atomic`], but never replaces an existing file.
///
/// The synced sibling is hard-linked onto `path`, which fails if `path` is already
/// taken, so of several racing writers exactly one succeeds.
pub(crate) async fn write_new(path: &Path, data: &[u8]) -> StoreResult<()> {
    let temp_path = temp_path_for(path)?;
    let result = match write_synced(&temp_path, data).await {
        Ok(()) => fs::hard_link(&temp_path, path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => StoreError::AlreadyExists(format!(
                "can't create file that already exists: {}",
                path.display()
            )),
            _ => StoreError::Io(e),
        }),
        Err(e) => Err(e),
    };
    remove_temp(&temp_path).await;
    result
}

fn temp_path_for(path: &Path) -> StoreResult<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        StoreError::InvalidPath(format!("{} has no parent directory", path.display()))
    })?;
    Ok(parent.join(format!("{}{}{}", TEMP_PREFIX, Uuid::new_v4(), TEMP_SUFFIX)))
}

async fn write_synced(temp_path: &Path, data: &[u8]) -> StoreResult<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

async fn remove_temp(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(
                path = %temp_path.display(),
                error = %e,
                "Failed to remove temporary file"
            );
        }
    }
}

/// Every regular file under `root` (recursively) whose name ends with `file_extension`.
pub(crate) async fn list_files(root: PathBuf, file_extension: String) -> StoreResult<Vec<PathBuf>> {
    tokio::task::spawn_blocking(move || {
        WalkDir::new(&root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| name.len() > file_extension.len() && name.ends_with(&file_extension))
                    .unwrap_or(false)
            })
            .map(|entry| entry.into_path())
            .collect()
    })
    .await
    .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

/// First regular file under `root` (recursively) named exactly `file_name`.
pub(crate) async fn find_file(root: PathBuf, file_name: String) -> StoreResult<Option<PathBuf>> {
    tokio::task::spawn_blocking(move || {
        WalkDir::new(&root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name.as_str())
            .map(|entry| entry.into_path())
    })
    .await
    .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

/// Create `path`'s parent directories. Safe to race with other creators.
pub(crate) async fn ensure_parent_dir(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}
