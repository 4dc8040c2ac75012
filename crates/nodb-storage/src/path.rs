//! Default path resolver
//!
//! Objects live directly under `<projects root>/<project id>/<collection>/`, one file
//! per key. The object itself never influences the location.

use async_trait::async_trait;
use nodb_core::{StoragePathOptionsResolver, StoreResult};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use crate::files;
use crate::keys::{ensure_within, file_name_for, validate_segment};
use crate::traits::StoragePathResolver;

pub struct DefaultStoragePathResolver<T> {
    options_resolver: Arc<dyn StoragePathOptionsResolver>,
    collection: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DefaultStoragePathResolver<T> {
    /// Resolver whose collection folder is derived from `T`'s type name.
    pub fn new(options_resolver: Arc<dyn StoragePathOptionsResolver>) -> Self {
        Self {
            options_resolver,
            collection: collection_folder_name::<T>(),
            _marker: PhantomData,
        }
    }

    /// Store objects under `collection` instead of the type-derived folder.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub(crate) async fn project_root(&self, project_id: &str) -> StoreResult<PathBuf> {
        validate_segment("projectId", project_id)?;
        validate_segment("collection", &self.collection)?;

        let options = self.options_resolver.resolve(project_id).await?;
        let root = options
            .projects_root()
            .join(project_id)
            .join(&self.collection);

        ensure_within(&options.storage_root(), &root)?;
        Ok(root)
    }

    pub(crate) async fn file_path(
        &self,
        project_id: &str,
        key: &str,
        file_extension: &str,
    ) -> StoreResult<PathBuf> {
        validate_segment("key", key)?;
        let file_name = file_name_for(key, file_extension);
        validate_segment("file name", &file_name)?;

        Ok(self.project_root(project_id).await?.join(file_name))
    }
}

#[async_trait]
impl<T> StoragePathResolver<T> for DefaultStoragePathResolver<T>
where
    T: Send + Sync + 'static,
{
    async fn resolve_for_write(
        &self,
        project_id: &str,
        key: &str,
        _obj: Option<&T>,
        file_extension: &str,
        ensure_folders_exist: bool,
    ) -> StoreResult<PathBuf> {
        let path = self.file_path(project_id, key, file_extension).await?;
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
        self.file_path(project_id, key, file_extension).await
    }

    async fn resolve_project_root(&self, project_id: &str) -> StoreResult<PathBuf> {
        self.project_root(project_id).await
    }
}

/// Lowercased, pluralised final segment of `T`'s type name: `blog::BlogPost` is `blogposts`.
pub fn collection_folder_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    let short = without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics);
    format!("{}s", short.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodb_core::{DefaultStoragePathOptionsResolver, StoreError};
    use tempfile::tempdir;

    struct BlogPost;
    struct Wrapper<U>(U);

    fn resolver_at(root: PathBuf) -> DefaultStoragePathResolver<BlogPost> {
        DefaultStoragePathResolver::new(Arc::new(DefaultStoragePathOptionsResolver::new(
            Arc::new(root),
        )))
    }

    #[test]
    fn collection_name_from_type() {
        assert_eq!(collection_folder_name::<BlogPost>(), "blogposts");
        assert_eq!(collection_folder_name::<Wrapper<BlogPost>>(), "wrappers");
        assert_eq!(collection_folder_name::<String>(), "strings");
    }

    #[tokio::test]
    async fn read_and_write_agree() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf());

        let write = resolver
            .resolve_for_write("tenant", "post-1", None, ".json", true)
            .await
            .unwrap();
        let read = resolver.resolve_for_read("tenant", "post-1", ".json").await.unwrap();

        assert_eq!(write, read);
        assert_eq!(
            read,
            dir.path()
                .join("nodb_storage/projects/tenant/blogposts/post-1.json")
        );
        assert!(read.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn read_does_not_create_folders() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf());

        let path = resolver.resolve_for_read("tenant", "k", ".json").await.unwrap();
        assert!(!path.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn tenants_do_not_share_folders() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf());

        let a = resolver.resolve_project_root("a").await.unwrap();
        let b = resolver.resolve_project_root("b").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn custom_collection() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf()).with_collection("posts");
        let root = resolver.resolve_project_root("t").await.unwrap();
        assert!(root.ends_with("projects/t/posts"));
    }

    #[tokio::test]
    async fn path_escape_rejected() {
        let dir = tempdir().unwrap();
        let resolver = resolver_at(dir.path().to_path_buf());

        let result = resolver.resolve_project_root("..").await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));

        let result = resolver.resolve_for_read("t", "../../etc/passwd", ".json").await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));

        let result = resolver
            .resolve_for_write("t/../../x", "k", None, ".json", true)
            .await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }
}
