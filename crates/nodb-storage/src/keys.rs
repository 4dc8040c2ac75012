//! Validation for project ids, keys and collection names.
//!
//! Each of these becomes exactly one path segment, so anything that could walk out of
//! its folder is rejected before a path is built.

use nodb_core::{StoreError, StoreResult};
use std::path::{Component, Path};

/// Reject blank required values.
pub fn ensure_provided(name: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::missing(name));
    }
    Ok(())
}

/// Reject values that are not a single, plain path segment.
pub fn validate_segment(name: &str, value: &str) -> StoreResult<()> {
    ensure_provided(name, value)?;

    if value == "." || value == ".." {
        return Err(StoreError::InvalidPath(format!(
            "{} must not be a relative path component: {}",
            name, value
        )));
    }

    if value.contains(&['/', '\\', '\0'][..]) {
        return Err(StoreError::InvalidPath(format!(
            "{} contains invalid characters: {}",
            name, value
        )));
    }

    Ok(())
}

/// Ensure `path` stays inside `root`, comparing components lexically.
pub fn ensure_within(root: &Path, path: &Path) -> StoreResult<()> {
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::ParentDir));

    if escapes || !path.starts_with(root) {
        return Err(StoreError::InvalidPath(format!(
            "{} resolves outside storage directory {}",
            path.display(),
            root.display()
        )));
    }
    Ok(())
}

/// File name for a key: `<key><extension>`.
pub fn file_name_for(key: &str, file_extension: &str) -> String {
    format!("{}{}", key, file_extension)
}

/// Key for a file name, if it carries the expected extension.
pub fn key_from_file_name<'a>(file_name: &'a str, file_extension: &str) -> Option<&'a str> {
    file_name
        .strip_suffix(file_extension)
        .filter(|key| !key.is_empty())
}
