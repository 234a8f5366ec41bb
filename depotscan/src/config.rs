//! Persistent scanner configuration.
//!
//! Stored as JSON in a platform-appropriate config directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk configuration for the scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `item_index.json` and `items/<item_id>.png`.
    pub resource_dir: PathBuf,

    /// OCR language code, selects `ocr/<lang>_recognition.mnn`.
    pub ocr_lang: String,

    /// Where annotated debug images go. `None` disables them.
    pub debug_dir: Option<PathBuf>,

    /// Grid geometry and quantity-label tuning.
    pub depot: ie::DepotConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("resource"),
            ocr_lang: "ch".to_string(),
            debug_dir: None,
            depot: ie::DepotConfig::default(),
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("depotscan.json"))
    }

    pub fn item_index(&self) -> PathBuf {
        self.resource_dir.join("item_index.json")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.resource_dir.join("items")
    }

    /// Load configuration from disk, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk.
    pub fn try_load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("parse {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
        tracing::info!(path = %path.display(), "saved config");
        Ok(())
    }
}
