use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Location shown by providers until the user configures one.
pub const DEFAULT_LOCATION: &str = "Kyiv";

/// Default `-v` count when the flag is absent.
pub const DEFAULT_VERBOSE_LEVEL: u8 = 0;

/// Default output formatter name.
pub const DEFAULT_FORMATTER: &str = "table";

/// Per-provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides [`Config::location`] for this provider only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Location used by every provider without its own override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    /// location = "Lviv"
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, name: &str) -> Option<&str> {
        self.provider(name).and_then(|cfg| cfg.api_key.as_deref())
    }

    /// Location for `name`: its own override, then the global one, then [`DEFAULT_LOCATION`].
    pub fn location_for(&self, name: &str) -> &str {
        self.provider(name)
            .and_then(|cfg| cfg.location.as_deref())
            .or(self.location.as_deref())
            .unwrap_or(DEFAULT_LOCATION)
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, name: &str, api_key: String) {
        self.providers.entry(name.to_string()).or_default().api_key = Some(api_key);
    }

    pub fn set_provider_location(&mut self, name: &str, location: String) {
        self.providers.entry(name.to_string()).or_default().location = Some(location);
    }

    pub fn is_provider_configured(&self, name: &str) -> bool {
        self.provider_api_key(name).is_some()
    }
}
