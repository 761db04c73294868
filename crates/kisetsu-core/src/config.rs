use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::KisetsuError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub resolver: ResolverConfig,
    pub anilist: AniListConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Minimum title similarity (0–100) for a synonym to be kept.
    pub similarity_threshold: u32,
    /// Walk prequel chains; when off every record stands alone.
    pub follow_prequels: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniListConfig {
    pub api_url: String,
    /// Ids per media request. AniList caps pages at 50.
    pub batch_size: usize,
    pub per_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where per-season mapping files are written and merged from.
    pub directory: PathBuf,
    pub mappings_file: PathBuf,
}

impl AppConfig {
    /// Load config: user file (if exists), otherwise built-in defaults.
    pub fn load() -> Result<Self, KisetsuError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            Self::defaults()
        }
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, KisetsuError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| KisetsuError::Config(format!("{}: {e}", path.display())))?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|e| KisetsuError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn defaults() -> Result<Self, KisetsuError> {
        toml::from_str(DEFAULT_CONFIG).map_err(|e| KisetsuError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), KisetsuError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| KisetsuError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "kisetsu")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    fn validate(&self) -> Result<(), KisetsuError> {
        if self.resolver.similarity_threshold > 100 {
            return Err(KisetsuError::Config(format!(
                "similarity_threshold must be within 0-100, got {}",
                self.resolver.similarity_threshold
            )));
        }
        if !(1..=50).contains(&self.anilist.batch_size) {
            return Err(KisetsuError::Config(format!(
                "batch_size must be within 1-50, got {}",
                self.anilist.batch_size
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
