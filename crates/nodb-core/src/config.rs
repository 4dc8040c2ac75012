//! Configuration module
//!
//! Storage configuration is read from the environment (optionally seeded from a
//! `.env` file). Every setting has a default so an empty environment is valid.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::options::HostEnvironment;

pub const DEFAULT_BASE_FOLDER: &str = "nodb_storage";
pub const DEFAULT_PROJECTS_FOLDER: &str = "projects";

/// How `update` replaces an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Write a temporary file and rename it over the old one. Readers never see the
    /// key missing, but the original creation timestamp is not kept.
    #[default]
    Replace,
    /// Remove the old file, then write the new one. Leaves a window where the key
    /// looks deleted. Kept for compatibility with stores that relied on it.
    DeleteThenWrite,
}

impl FromStr for UpdateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(UpdateMode::Replace),
            "delete_then_write" | "delete-then-write" => Ok(UpdateMode::DeleteThenWrite),
            _ => Err(anyhow::anyhow!("Invalid update mode: {}", s)),
        }
    }
}

impl Display for UpdateMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UpdateMode::Replace => write!(f, "replace"),
            UpdateMode::DeleteThenWrite => write!(f, "delete_then_write"),
        }
    }
}

/// Lifetime of the services handed out by a provider.
///
/// A provider uses exactly one of these; there is no mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceLifetime {
    /// Fresh commands and queries for every scope.
    #[default]
    Scoped,
    /// One shared set of commands and queries.
    Singleton,
}

impl FromStr for ServiceLifetime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scoped" => Ok(ServiceLifetime::Scoped),
            "singleton" => Ok(ServiceLifetime::Singleton),
            _ => Err(anyhow::anyhow!("Invalid service lifetime: {}", s)),
        }
    }
}

impl Display for ServiceLifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ServiceLifetime::Scoped => write!(f, "scoped"),
            ServiceLifetime::Singleton => write!(f, "singleton"),
        }
    }
}

/// NoDb storage configuration
#[derive(Clone, Debug)]
pub struct NoDbConfig {
    pub content_root: PathBuf,
    pub base_folder: String,
    pub projects_folder: String,
    pub update_mode: UpdateMode,
    pub service_lifetime: ServiceLifetime,
}

impl NoDbConfig {
    /// Configuration rooted at `content_root` with default folder names and modes.
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            base_folder: DEFAULT_BASE_FOLDER.to_string(),
            projects_folder: DEFAULT_PROJECTS_FOLDER.to_string(),
            update_mode: UpdateMode::default(),
            service_lifetime: ServiceLifetime::default(),
        }
    }

    pub fn with_update_mode(mut self, update_mode: UpdateMode) -> Self {
        self.update_mode = update_mode;
        self
    }

    pub fn with_service_lifetime(mut self, service_lifetime: ServiceLifetime) -> Self {
        self.service_lifetime = service_lifetime;
        self
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content_root = match lookup("NODB_CONTENT_ROOT").filter(|v| !v.trim().is_empty()) {
            Some(root) => PathBuf::from(root),
            None => env::current_dir()?,
        };

        let base_folder = lookup("NODB_BASE_FOLDER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_FOLDER.to_string());

        let projects_folder = lookup("NODB_PROJECTS_FOLDER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECTS_FOLDER.to_string());

        let update_mode = lookup("NODB_UPDATE_MODE")
            .map(|v| v.parse::<UpdateMode>())
            .transpose()?
            .unwrap_or_default();

        let service_lifetime = lookup("NODB_SERVICE_LIFETIME")
            .map(|v| v.parse::<ServiceLifetime>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            content_root,
            base_folder,
            projects_folder,
            update_mode,
            service_lifetime,
        })
    }
}

impl HostEnvironment for NoDbConfig {
    fn content_root_path(&self) -> PathBuf {
        self.content_root.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = NoDbConfig::from_lookup(lookup_from(&[("NODB_CONTENT_ROOT", "/srv/app")]))
            .unwrap();
        assert_eq!(config.content_root, PathBuf::from("/srv/app"));
        assert_eq!(config.base_folder, "nodb_storage");
        assert_eq!(config.projects_folder, "projects");
        assert_eq!(config.update_mode, UpdateMode::Replace);
        assert_eq!(config.service_lifetime, ServiceLifetime::Scoped);
    }

    #[test]
    fn reads_every_setting() {
        let config = NoDbConfig::from_lookup(lookup_from(&[
            ("NODB_CONTENT_ROOT", "/data"),
            ("NODB_BASE_FOLDER", "store"),
            ("NODB_PROJECTS_FOLDER", "tenants"),
            ("NODB_UPDATE_MODE", "delete_then_write"),
            ("NODB_SERVICE_LIFETIME", "Singleton"),
        ]))
        .unwrap();
        assert_eq!(config.base_folder, "store");
        assert_eq!(config.projects_folder, "tenants");
        assert_eq!(config.update_mode, UpdateMode::DeleteThenWrite);
        assert_eq!(config.service_lifetime, ServiceLifetime::Singleton);
    }

    #[test]
    fn rejects_unknown_update_mode() {
        let result = NoDbConfig::from_lookup(lookup_from(&[
            ("NODB_CONTENT_ROOT", "/data"),
            ("NODB_UPDATE_MODE", "overwrite"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn missing_content_root_falls_back_to_current_dir() {
        let config = NoDbConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.content_root, env::current_dir().unwrap());
    }

    #[test]
    fn enum_round_trip_through_display() {
        for mode in [UpdateMode::Replace, UpdateMode::DeleteThenWrite] {
            assert_eq!(mode.to_string().parse::<UpdateMode>().unwrap(), mode);
        }
        for lifetime in [ServiceLifetime::Scoped, ServiceLifetime::Singleton] {
            assert_eq!(
                lifetime.to_string().parse::<ServiceLifetime>().unwrap(),
                lifetime
            );
        }
    }
}
