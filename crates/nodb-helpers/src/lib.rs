//! NoDb Helpers
//!
//! Utilities built on the storage contracts. Currently the data migrator, which copies
//! every object of one tenant into another, possibly across store implementations.

pub mod migrator;

pub use migrator::{
    DataMigrator, DataMigratorOptions, ItemOutcome, KeyResolver, MigrationError, MigrationReport,
};
