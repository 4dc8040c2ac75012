//! Date-sharded path resolver
//!
//! Nests objects as `<project root>/<yyyy>/<mm>/<key><ext>` using a date the object
//! carries. A key stays unique across shards: once a file exists for a key, every
//! later read or write resolves to that file.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use nodb_core::{StoragePathOptionsResolver, StoreResult};
use std::path::PathBuf;
use std::sync::Arc;

use crate::files;
use crate::keys::{file_name_for, validate_segment};
use crate::path::DefaultStoragePathResolver;
use crate::traits::StoragePathResolver;

type DateOf<T> = dyn Fn(&T) -> DateTime<Utc> + Send + Sync;

pub struct DateShardedPathResolver<T> {
    inner: DefaultStoragePathResolver<T>,
    date_of: Arc<DateOf<T>>,
}

impl<T> DateShardedPathResolver<T> {
    pub fn new<F>(options_resolver: Arc<dyn StoragePathOptionsResolver>, date_of: F) -> Self
    where
        F: Fn(&T) -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            inner: DefaultStoragePathResolver::new(options_resolver),
            date_of: Arc::new(date_of),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.inner = self.inner.with_collection(collection);
        self
    }

    async fn existing(
        &self,
        project_id: &str,
        key: &str,
        file_extension: &str,
    ) -> StoreResult<(PathBuf, String, Option<PathBuf>)> {
        validate_segment("key", key)?;
        let file_name = file_name_for(key, file_extension);
        validate_segment("file name", &file_name)?;

        let root = self.inner.project_root(project_id).await?;
        if !tokio::fs::try_exists(&root).await? {
            return Ok((root, file_name, None));
        }
        let found = files::find_file(root.clone(), file_name.clone()).await?;
        Ok((root, file_name, found))
    }
}

#[async_trait]
impl<T> StoragePathResolver<T> for DateShardedPathResolver<T>
where
    T: Send + Sync + 'static,
{
    async fn resolve_for_write(
        &self,
        project_id: &str,
        key: &str,
        obj: Option<&T>,
        file_extension: &str,
        ensure_folders_exist: bool,
    ) -> StoreResult<PathBuf> {
        let (root, file_name, found) = self.existing(project_id, key, file_extension).await?;

        let path = match (found, obj) {
            (Some(existing), _) => existing,
            (None, Some(obj)) => {
                let date = (self.date_of)(obj);
                root.join(format!("{:04}", date.year()))
                    .join(format!("{:02}", date.month()))
                    .join(file_name)
            }
            (None, None) => root.join(file_name),
        };

        if ensure_folders_exist {
            files::ensure_parent_dir(&path).await?;
        }
        Ok(path)
    }

    async fn resolve_for_read(
        &self,
        project_id: &str,
        key: &str,
        file_extension: &str,
    ) -> StoreResult<PathBuf> {
        let (root, file_name, found) = self.existing(project_id, key, file_extension).await?;
        Ok(found.unwrap_or_else(|| root.join(file_name)))
    }

    async fn resolve_project_root(&self, project_id: &str) -> StoreResult<PathBuf> {
        self.inner.project_root(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nodb_core::{DefaultStoragePathOptionsResolver, StoreError};
    use tempfile::tempdir;

    struct Post {
        published: DateTime<Utc>,
    }

    fn resolver_at(root: PathBuf) -> DateShardedPathResolver<Post> {
        DateShardedPathResolver::new(
            Arc::new(DefaultStoragePathOptionsResolver::new(Arc::new(root))),
            |post: &Post| post.published,
        )
    }

    fn post(year: i32, month: u32) -> Post {
        Post {
            published: Utc.with_ymd_and_hms(year, month, 3, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn writes_nest_by_year_and_month() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf());

        let path = resolver
            .resolve_for_write("blog", "hello", Some(&post(2016, 4)), ".json", true)
            .await
            .unwrap();

        assert!(path.ends_with("projects/blog/posts/2016/04/hello.json"));
        assert!(path.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn read_finds_nested_file() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf());

        let written = resolver
            .resolve_for_write("blog", "hello", Some(&post(2016, 4)), ".json", true)
            .await
            .unwrap();
        tokio::fs::write(&written, "{}").await.unwrap();

        let read = resolver.resolve_for_read("blog", "hello", ".json").await.unwrap();
        assert_eq!(read, written);
    }

    #[tokio::test]
    async fn existing_location_wins_over_new_date() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf());

        let original = resolver
            .resolve_for_write("blog", "hello", Some(&post(2016, 4)), ".json", true)
            .await
            .unwrap();
        tokio::fs::write(&original, "{}").await.unwrap();

        let update = resolver
            .resolve_for_write("blog", "hello", Some(&post(2018, 11)), ".json", false)
            .await
            .unwrap();
        assert_eq!(update, original);
    }

    #[tokio::test]
    async fn missing_read_points_at_root() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf());

        let read = resolver.resolve_for_read("blog", "nope", ".json").await.unwrap();
        assert!(read.ends_with("projects/blog/posts/nope.json"));
        assert!(!read.exists());
    }

    #[tokio::test]
    async fn rejects_traversal() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf());
        let result = resolver.resolve_for_read("blog", "../x", ".json").await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }
}
