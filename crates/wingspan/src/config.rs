//! Configuration management for wingspan.
//!
//! Configuration is loaded with figment from built-in defaults, an optional
//! TOML file and `WINGSPAN_` environment variables.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::catalog::SortOrder;
use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "wingspan";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "wingspan.db";

/// Default last-viewed file name.
const LAST_VIEWED_FILE_NAME: &str = "last_viewed.json";

/// Environment variable prefix.
const ENV_PREFIX: &str = "WINGSPAN_";

/// Separates section from key in environment variable names, since keys
/// themselves contain underscores: `WINGSPAN_CATALOG__DEFAULT_SORT`.
const ENV_SEPARATOR: &str = "__";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`WINGSPAN_<SECTION>__<KEY>`)
/// 2. TOML config file at `~/.config/wingspan/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Catalog configuration.
    pub catalog: CatalogConfig,
    /// Checklist configuration.
    pub checklist: ChecklistConfig,
}

/// Where durable state lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/wingspan/wingspan.db`
    pub database_path: Option<PathBuf>,
    /// Path to the last-viewed aircraft file.
    /// Defaults to `~/.local/share/wingspan/last_viewed.json`
    pub last_viewed_path: Option<PathBuf>,
}

/// Catalog presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Order used when listing aircraft.
    pub default_sort: SortOrder,
}

/// Checklist behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistConfig {
    /// Ask before resetting checklists.
    pub confirm_resets: bool,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            confirm_resets: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation
    /// fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let database = self.database_path();
        if self.last_viewed_path() == database {
            return Err(Error::ConfigValidation {
                message: format!(
                    "last_viewed_path and database_path must differ (both {})",
                    database.display()
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the last-viewed file path, resolving defaults if not set.
    #[must_use]
    pub fn last_viewed_path(&self) -> PathBuf {
        self.storage
            .last_viewed_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(LAST_VIEWED_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.storage.last_viewed_path.is_none());
        assert_eq!(config.catalog.default_sort, SortOrder::ModelName);
        assert!(config.checklist.confirm_resets);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_shared_path() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/tmp/same"));
        config.storage.last_viewed_path = Some(PathBuf::from("/tmp/same"));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.ends_with("wingspan/wingspan.db"));
    }

    #[test]
    fn test_last_viewed_path_default() {
        let path = Config::default().last_viewed_path();
        assert!(path.ends_with("wingspan/last_viewed.json"));
    }

    #[test]
    fn test_paths_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));
        config.storage.last_viewed_path = Some(PathBuf::from("/custom/last.json"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
        assert_eq!(config.last_viewed_path(), PathBuf::from("/custom/last.json"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.ends_with("wingspan/config.toml"));
    }

    // Tests that call `load_from` run inside a `Jail`: it serializes them and
    // restores the process environment afterwards.

    #[test]
    fn test_load_nonexistent_config() {
        Jail::expect_with(|_| {
            let config =
                Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[storage]
database_path = "/data/wingspan.db"

[catalog]
default_sort = "manufacturer"

[checklist]
confirm_resets = false
"#,
            )?;

            let config = Config::load_from(Some(jail.directory().join("config.toml"))).unwrap();
            assert_eq!(config.database_path(), PathBuf::from("/data/wingspan.db"));
            assert_eq!(config.catalog.default_sort, SortOrder::Manufacturer);
            assert!(!config.checklist.confirm_resets);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_bad_sort() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[catalog]\ndefault_sort = \"altitude\"\n")?;

            let err = Config::load_from(Some(jail.directory().join("config.toml"))).unwrap_err();
            assert!(matches!(err, Error::ConfigLoad(_)));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_shared_path() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[storage]\ndatabase_path = \"/x\"\nlast_viewed_path = \"/x\"\n",
            )?;

            let err = Config::load_from(Some(jail.directory().join("config.toml"))).unwrap_err();
            assert!(matches!(err, Error::ConfigValidation { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_every_section() {
        Jail::expect_with(|jail| {
            jail.set_env("WINGSPAN_STORAGE__DATABASE_PATH", "/env/wingspan.db");
            jail.set_env("WINGSPAN_STORAGE__LAST_VIEWED_PATH", "/env/last.json");
            jail.set_env("WINGSPAN_CATALOG__DEFAULT_SORT", "manufacturer");
            jail.set_env("WINGSPAN_CHECKLIST__CONFIRM_RESETS", "false");

            let config = Config::load_from(Some(jail.directory().join("missing.toml"))).unwrap();
            assert_eq!(config.database_path(), PathBuf::from("/env/wingspan.db"));
            assert_eq!(config.last_viewed_path(), PathBuf::from("/env/last.json"));
            assert_eq!(config.catalog.default_sort, SortOrder::Manufacturer);
            assert!(!config.checklist.confirm_resets);
            Ok(())
        });
    }

    #[test]
    fn test_env_wins_over_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[catalog]\ndefault_sort = \"manufacturer\"\n")?;
            jail.set_env("WINGSPAN_CATALOG__DEFAULT_SORT", "model_name");

            let config = Config::load_from(Some(jail.directory().join("config.toml"))).unwrap();
            assert_eq!(config.catalog.default_sort, SortOrder::ModelName);
            Ok(())
        });
    }

    #[test]
    fn test_env_shared_path_fails_validation() {
        Jail::expect_with(|jail| {
            jail.set_env("WINGSPAN_STORAGE__DATABASE_PATH", "/same");
            jail.set_env("WINGSPAN_STORAGE__LAST_VIEWED_PATH", "/same");

            let err = Config::load_from(Some(jail.directory().join("missing.toml"))).unwrap_err();
            assert!(matches!(err, Error::ConfigValidation { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("\"default_sort\":\"model_name\""));
        assert!(json.contains("\"confirm_resets\":true"));
    }

    #[test]
    fn test_partial_section_deserialize() {
        let config: Config = serde_json::from_str(r#"{"checklist": {}}"#).unwrap();
        assert!(config.checklist.confirm_resets);
    }
}
