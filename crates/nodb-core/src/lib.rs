//! NoDb Core Library
//!
//! This crate provides the error type, configuration, path options and lifecycle
//! state shared by the NoDb storage and helper crates.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod options;
#[cfg(feature = "telemetry")]
pub mod telemetry;

// Re-export commonly used types
pub use config::{NoDbConfig, ServiceLifetime, UpdateMode};
pub use error::{StoreError, StoreErrorKind, StoreResult};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use options::{
    DefaultStoragePathOptionsResolver, HostEnvironment, StoragePathOptions,
    StoragePathOptionsResolver,
};
#[cfg(feature = "telemetry")]
pub use telemetry::init_tracing;
