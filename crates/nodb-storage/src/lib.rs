//! NoDb Storage Library
//!
//! Persists objects as individually named files under a per-tenant folder tree.
//! Where a file lives is decided by a [`StoragePathResolver`], how it is encoded by a
//! [`StringSerializer`]; commands and queries only orchestrate the two.
//!
//! # Storage layout
//!
//! With the default resolver every object of type `T` lives at
//!
//! `<content root>/nodb_storage/projects/<project id>/<collection>/<key>.json`
//!
//! where `<collection>` is derived from the type name (`BlogPost` becomes `blogposts`).
//! Project ids, collection names and keys must be single path segments; anything that
//! would resolve outside the storage root is rejected.

#[cfg_attr(not(feature = "storage-local"), allow(dead_code))]
mod files;
pub mod keys;
pub mod path;
pub mod serializer;
pub mod sharded;
pub mod traits;

#[cfg(feature = "storage-local")]
pub mod commands;
#[cfg(feature = "storage-local")]
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod queries;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use commands::LocalCommands;
#[cfg(feature = "storage-local")]
pub use factory::{create_nodb, NoDbProvider, NoDbServices};
pub use nodb_core::{
    LifecycleState, NoDbConfig, ServiceLifetime, StoreError, StoreErrorKind, StoreResult,
    UpdateMode,
};
pub use path::DefaultStoragePathResolver;
#[cfg(feature = "storage-local")]
pub use queries::LocalQueries;
pub use serializer::JsonStringSerializer;
pub use sharded::DateShardedPathResolver;
pub use tokio_util::sync::CancellationToken;
pub use traits::{
    BasicCommands, BasicQueries, CreateCommand, GetAllQuery, StoragePathResolver,
    StringSerializer,
};
