use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::parsing::zones::DEFAULT_MAIN_ZONE;
use crate::document::TranscriptionOptions;
use crate::SegmentationPolicy;

pub const DEFAULT_CATALOGUE_ENDPOINT: &str = "http://catalogue.bnf.fr/api/SRU";

/// Configuration for altotext
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text reconstruction rules
    pub segmentation: SegmentationConfig,

    /// Zone selection
    pub zones: ZoneConfig,

    /// Catalogue lookups
    pub catalogue: CatalogueConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub policy: SegmentationPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Label of the main zone; `<label>#1`, `<label>#2`... are continuations
    pub main_label: String,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        ZoneConfig {
            main_label: DEFAULT_MAIN_ZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    /// SRU endpoint
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further retry
    pub backoff_ms: u64,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        CatalogueConfig {
            endpoint: DEFAULT_CATALOGUE_ENDPOINT.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            backoff_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from the config directory
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::get_config_path() {
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }

        // Return default configuration if no config found
        Ok(Config::default())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config directory
    pub fn save(&self) -> Result<Option<PathBuf>> {
        match Self::get_config_path() {
            Some(config_path) => {
                self.save_to(&config_path)?;
                Ok(Some(config_path))
            }
            None => Ok(None),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("altotext").join("config.toml"))
    }

    /// Initialize default config file
    pub fn init_default() -> Result<Option<PathBuf>> {
        Config::default().save()
    }

    pub fn transcription_options(&self) -> TranscriptionOptions {
        TranscriptionOptions {
            policy: self.segmentation.policy,
            main_zone: self.zones.main_label.clone(),
        }
    }
}
