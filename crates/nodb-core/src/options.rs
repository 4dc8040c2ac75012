//! Storage path options
//!
//! Path options are computed per tenant on every operation and never persisted.
//! They describe where the storage root lives; the path resolvers in `nodb-storage`
//! decide the layout below it.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{NoDbConfig, DEFAULT_BASE_FOLDER, DEFAULT_PROJECTS_FOLDER};
use crate::error::{StoreError, StoreResult};

/// Supplies the hosting application's content root.
pub trait HostEnvironment: Send + Sync {
    fn content_root_path(&self) -> PathBuf;
}

/// A fixed content root, handy for tests and embedded hosts.
impl HostEnvironment for PathBuf {
    fn content_root_path(&self) -> PathBuf {
        self.clone()
    }
}

/// Resolved storage options for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePathOptions {
    pub app_root_folder_path: PathBuf,
    pub base_folder_name: String,
    pub projects_folder_name: String,
}

impl StoragePathOptions {
    /// `<app root>/<base folder>`; nothing the store writes may live outside it.
    pub fn storage_root(&self) -> PathBuf {
        self.app_root_folder_path.join(&self.base_folder_name)
    }

    /// `<app root>/<base folder>/<projects folder>`
    pub fn projects_root(&self) -> PathBuf {
        self.storage_root().join(&self.projects_folder_name)
    }
}

/// Resolves the storage options for a tenant.
#[async_trait]
pub trait StoragePathOptionsResolver: Send + Sync {
    async fn resolve(&self, project_id: &str) -> StoreResult<StoragePathOptions>;
}

/// Options rooted at the host's content root.
#[derive(Clone)]
pub struct DefaultStoragePathOptionsResolver {
    host: Arc<dyn HostEnvironment>,
    base_folder_name: String,
    projects_folder_name: String,
}

impl DefaultStoragePathOptionsResolver {
    pub fn new(host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            host,
            base_folder_name: DEFAULT_BASE_FOLDER.to_string(),
            projects_folder_name: DEFAULT_PROJECTS_FOLDER.to_string(),
        }
    }

    pub fn from_config(config: &NoDbConfig) -> Self {
        Self {
            host: Arc::new(config.clone()),
            base_folder_name: config.base_folder.clone(),
            projects_folder_name: config.projects_folder.clone(),
        }
    }
}

#[async_trait]
impl StoragePathOptionsResolver for DefaultStoragePathOptionsResolver {
    async fn resolve(&self, project_id: &str) -> StoreResult<StoragePathOptions> {
        if project_id.trim().is_empty() {
            return Err(StoreError::missing("projectId"));
        }

        let app_root_folder_path = self.host.content_root_path();
        if app_root_folder_path.as_os_str().is_empty() {
            return Err(StoreError::Config(
                "content root path is not configured".to_string(),
            ));
        }

        Ok(StoragePathOptions {
            app_root_folder_path,
            base_folder_name: self.base_folder_name.clone(),
            projects_folder_name: self.projects_folder_name.clone(),
        })
    }
}
