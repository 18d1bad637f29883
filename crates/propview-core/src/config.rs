use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure
///
/// Loaded from the platform config dir; missing file means defaults
/// (demo catalog + local SQLite favorites).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    /// Only consulted when `data.mode = "remote"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,

    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    /// when no file exists yet
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents).map_err(|e| {
                crate::Error::Config(format!("Failed to parse config: {e}"))
            })?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk, creating the config directory if needed
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::Config("Could not find config directory".into()))?
            .join("propview");

        Ok(config_dir.join("config.toml"))
    }

    /// Where the favorites database lives; the configured override wins,
    /// otherwise the platform data dir. The directory is created on
    /// demand so first runs just work.
    pub fn favorites_db_path(&self) -> crate::Result<PathBuf> {
        if let Some(ref path) = self.store.db_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::Config("Could not find data directory".into()))?
            .join("propview");
        std::fs::create_dir_all(&data_dir)?;

        Ok(data_dir.join("favorites.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataConfig {
    #[serde(default)]
    pub mode: DataMode,
}

/// Which listing/favorite sources get wired up at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Bundled fixture listings + local SQLite favorites
    #[default]
    Memory,
    /// Hosted record service for both listings and favorites
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the record service
    pub base_url: String,

    /// API key sent as a bearer token
    pub api_key: String,

    #[serde(default = "default_listings_table")]
    pub listings_table: String,

    #[serde(default = "default_favorites_table")]
    pub favorites_table: String,
}

fn default_listings_table() -> String {
    "property".to_string()
}

fn default_favorites_table() -> String {
    "favorite".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Override for the favorites database path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_memory_mode() {
        let config = Config::default();
        assert_eq!(config.data.mode, DataMode::Memory);
        assert!(config.remote.is_none());
        assert!(config.store.db_path.is_none());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config {
            data: DataConfig {
                mode: DataMode::Remote,
            },
            remote: Some(RemoteConfig {
                base_url: "https://records.example.com".to_string(),
                api_key: "pk_test".to_string(),
                listings_table: default_listings_table(),
                favorites_table: default_favorites_table(),
            }),
            store: StoreConfig::default(),
        };

        let raw = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&raw).unwrap();

        assert_eq!(back.data.mode, DataMode::Remote);
        assert_eq!(back.remote.unwrap().listings_table, "property");
    }

    #[test]
    fn test_remote_table_names_default() {
        let raw = r#"
            [data]
            mode = "remote"

            [remote]
            base_url = "https://records.example.com"
            api_key = "pk_test"
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        let remote = config.remote.unwrap();
        assert_eq!(remote.listings_table, "property");
        assert_eq!(remote.favorites_table, "favorite");
    }
}
