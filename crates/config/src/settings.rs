// Grid settings
// Loaded from ~/.config/surveygrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use surveygrid_engine::GridOptions;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    // Persistence
    #[serde(rename = "grid.debounceMs")]
    pub debounce_ms: u64,

    // Shape
    #[serde(rename = "grid.minColumns")]
    pub min_columns: usize,

    #[serde(rename = "grid.autoExpand")]
    pub auto_expand: bool,

    // Interaction
    #[serde(rename = "grid.enableReorder")]
    pub enable_reorder: bool,

    #[serde(rename = "grid.enableDelete")]
    pub enable_delete: bool,

    // Extra form presets layered over the built-ins
    #[serde(rename = "forms.catalog", skip_serializing_if = "Option::is_none")]
    pub forms_catalog: Option<PathBuf>,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_columns: 1,
            auto_expand: true,
            enable_reorder: true,
            enable_delete: true,
            forms_catalog: None,
        }
    }
}

impl GridSettings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("surveygrid")
            .join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load and validate a settings file. `//` comment lines are allowed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        let settings: Self = serde_json::from_str(&cleaned)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_columns == 0 {
            return Err(ConfigError::ZeroMinColumns {
                context: "settings".to_string(),
            });
        }
        Ok(())
    }

    /// Save current settings to disk
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| ConfigError::io(path, e))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn to_options(&self) -> GridOptions {
        GridOptions {
            min_columns: self.min_columns.max(1),
            auto_expand: self.auto_expand,
            enable_reorder: self.enable_reorder,
            enable_delete: self.enable_delete,
        }
    }
}
