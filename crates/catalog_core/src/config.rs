//! Runtime configuration for catalog hosts.
//!
//! # Responsibility
//! - Resolve database path, image directory and logging settings.
//! - Read overrides from `CATALOG_*` environment variables.
//!
//! # Invariants
//! - Blank environment values are ignored, never treated as paths.
//! - Resolution never fails; invalid log settings surface at `init_logging`.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "CATALOG_DB_PATH";
pub const IMAGE_DIR_ENV: &str = "CATALOG_IMAGE_DIR";
pub const LOG_LEVEL_ENV: &str = "CATALOG_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CATALOG_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "catalog.sqlite3";
const DEFAULT_IMAGE_DIR: &str = "images";

/// Settings needed to wire a catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub db_path: PathBuf,
    pub image_dir: PathBuf,
    pub log_level: String,
    /// File logging is enabled only when set.
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CatalogConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(value) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = read(IMAGE_DIR_ENV) {
            config.image_dir = PathBuf::from(value);
        }
        if let Some(value) = read(LOG_LEVEL_ENV) {
            config.log_level = value;
        }
        config.log_dir = read(LOG_DIR_ENV).map(PathBuf::from);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogConfig, DB_PATH_ENV, IMAGE_DIR_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = CatalogConfig::from_lookup(|_| None);
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.db_path, PathBuf::from("catalog.sqlite3"));
        assert_eq!(config.image_dir, PathBuf::from("images"));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn environment_values_override_defaults() {
        let config = CatalogConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, " /var/lib/catalog/db.sqlite3 "),
            (IMAGE_DIR_ENV, "/var/lib/catalog/images"),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/catalog"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/var/lib/catalog/db.sqlite3"));
        assert_eq!(config.image_dir, PathBuf::from("/var/lib/catalog/images"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/catalog")));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = CatalogConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, "   ")]));
        assert_eq!(config.db_path, PathBuf::from("catalog.sqlite3"));
    }
}
