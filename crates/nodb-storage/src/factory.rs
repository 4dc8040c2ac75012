//! Service registration
//!
//! Wires the default serializer, path resolver, commands and queries for one object
//! type. A provider hands out services with exactly one [`ServiceLifetime`].

use nodb_core::{
    DefaultStoragePathOptionsResolver, NoDbConfig, ServiceLifetime, StoragePathOptionsResolver,
    UpdateMode,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::commands::LocalCommands;
use crate::path::DefaultStoragePathResolver;
use crate::queries::LocalQueries;
use crate::serializer::JsonStringSerializer;
use crate::traits::{
    BasicCommands, BasicQueries, CreateCommand, GetAllQuery, StoragePathResolver, StringSerializer,
};

/// The services for one scope.
pub struct NoDbServices<T>
where
    T: Send + Sync + 'static,
{
    commands: Arc<LocalCommands<T>>,
    queries: Arc<LocalQueries<T>>,
    serializer: Arc<dyn StringSerializer<T>>,
    path_resolver: Arc<dyn StoragePathResolver<T>>,
}

impl<T> Clone for NoDbServices<T>
where
    T: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            queries: self.queries.clone(),
            serializer: self.serializer.clone(),
            path_resolver: self.path_resolver.clone(),
        }
    }
}

impl<T> NoDbServices<T>
where
    T: Send + Sync + 'static,
{
    pub fn commands(&self) -> Arc<dyn BasicCommands<T>> {
        self.commands.clone()
    }

    pub fn create_command(&self) -> Arc<dyn CreateCommand<T>> {
        self.commands.clone()
    }

    pub fn queries(&self) -> Arc<dyn BasicQueries<T>> {
        self.queries.clone()
    }

    pub fn get_all_query(&self) -> Arc<dyn GetAllQuery<T>> {
        self.queries.clone()
    }

    pub fn serializer(&self) -> Arc<dyn StringSerializer<T>> {
        self.serializer.clone()
    }

    pub fn path_resolver(&self) -> Arc<dyn StoragePathResolver<T>> {
        self.path_resolver.clone()
    }
}

/// Hands out [`NoDbServices`] according to its lifetime.
pub struct NoDbProvider<T>
where
    T: Send + Sync + 'static,
{
    lifetime: ServiceLifetime,
    update_mode: UpdateMode,
    serializer: Arc<dyn StringSerializer<T>>,
    path_resolver: Arc<dyn StoragePathResolver<T>>,
    singleton: Option<NoDbServices<T>>,
}

impl<T> NoDbProvider<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(
        lifetime: ServiceLifetime,
        update_mode: UpdateMode,
        serializer: Arc<dyn StringSerializer<T>>,
        path_resolver: Arc<dyn StoragePathResolver<T>>,
    ) -> Self {
        let mut provider = Self {
            lifetime,
            update_mode,
            serializer,
            path_resolver,
            singleton: None,
        };
        if lifetime == ServiceLifetime::Singleton {
            provider.singleton = Some(provider.build());
        }
        provider
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    /// Services for the caller's scope. Singleton providers always return the same
    /// instances; scoped providers build new commands and queries on every call.
    pub fn services(&self) -> NoDbServices<T> {
        match &self.singleton {
            Some(services) => services.clone(),
            None => self.build(),
        }
    }

    fn build(&self) -> NoDbServices<T> {
        let commands = LocalCommands::new(self.path_resolver.clone(), self.serializer.clone())
            .with_update_mode(self.update_mode);
        let queries = LocalQueries::new(self.path_resolver.clone(), self.serializer.clone());

        NoDbServices {
            commands: Arc::new(commands),
            queries: Arc::new(queries),
            serializer: self.serializer.clone(),
            path_resolver: self.path_resolver.clone(),
        }
    }
}

/// Create a provider with the default JSON serializer and path layout.
pub fn create_nodb<T>(config: &NoDbConfig) -> NoDbProvider<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let options_resolver: Arc<dyn StoragePathOptionsResolver> =
        Arc::new(DefaultStoragePathOptionsResolver::from_config(config));
    let path_resolver: Arc<dyn StoragePathResolver<T>> =
        Arc::new(DefaultStoragePathResolver::<T>::new(options_resolver));
    let serializer: Arc<dyn StringSerializer<T>> = Arc::new(JsonStringSerializer::<T>::new());

    tracing::debug!(
        content_root = %config.content_root.display(),
        lifetime = %config.service_lifetime,
        update_mode = %config.update_mode,
        "Creating NoDb provider"
    );

    NoDbProvider::new(
        config.service_lifetime,
        config.update_mode,
        serializer,
        path_resolver,
    )
}
