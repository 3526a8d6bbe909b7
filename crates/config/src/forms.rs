//! Per-form grid presets.
//!
//! Each survey screen (cabinets, PDUs, ...) declares its field keys and may
//! override the global grid settings. Catalogs are TOML:
//!
//! ```toml
//! [forms.cabinets]
//! field_keys = ["make", "model", "serial"]
//! min_columns = 2
//! enable_reorder = false
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use surveygrid_engine::{FieldSchema, GridOptions};

use crate::error::ConfigError;
use crate::settings::GridSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPreset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub field_keys: Vec<String>,

    // Overrides; unset falls through to GridSettings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_columns: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_expand: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_reorder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_delete: Option<bool>,
}

impl FormPreset {
    pub fn new<I, S>(field_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            field_keys: field_keys.into_iter().map(Into::into).collect(),
            min_columns: None,
            auto_expand: None,
            enable_reorder: None,
            enable_delete: None,
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn min_columns(mut self, n: usize) -> Self {
        self.min_columns = Some(n);
        self
    }

    pub fn schema(&self, form: &str) -> Result<FieldSchema, ConfigError> {
        if let Some(position) = self.field_keys.iter().position(|k| k.trim().is_empty()) {
            return Err(ConfigError::EmptyFieldKey {
                form: form.to_string(),
                position,
            });
        }
        FieldSchema::new(self.field_keys.iter().cloned()).map_err(|source| ConfigError::Schema {
            form: form.to_string(),
            source,
        })
    }

    /// Grid options for this form, layered over `settings`.
    pub fn options(&self, settings: &GridSettings) -> GridOptions {
        let base = settings.to_options();
        GridOptions {
            min_columns: self.min_columns.unwrap_or(base.min_columns).max(1),
            auto_expand: self.auto_expand.unwrap_or(base.auto_expand),
            enable_reorder: self.enable_reorder.unwrap_or(base.enable_reorder),
            enable_delete: self.enable_delete.unwrap_or(base.enable_delete),
        }
    }

    pub fn validate(&self, form: &str) -> Result<(), ConfigError> {
        if self.min_columns == Some(0) {
            return Err(ConfigError::ZeroMinColumns {
                context: format!("form '{}'", form),
            });
        }
        self.schema(form).map(|_| ())
    }
}

/// Everything needed to mount a grid for one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedForm {
    pub name: String,
    pub schema: FieldSchema,
    pub options: GridOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCatalog {
    #[serde(default)]
    pub forms: BTreeMap<String, FormPreset>,
}

impl FormCatalog {
    /// Presets shipped with the binary. Field keys are generic placeholders.
    pub fn builtin() -> Self {
        let forms = [
            (
                "cabinets",
                FormPreset::new(["make", "model", "serial", "location"]).titled("Cabinets"),
            ),
            (
                "pdus",
                FormPreset::new(["make", "model", "rating", "outlets"])
                    .titled("PDUs")
                    .min_columns(2),
            ),
            (
                "antennas",
                FormPreset::new(["make", "model", "azimuth", "height", "tilt"])
                    .titled("Antennas")
                    .min_columns(3),
            ),
            (
                "fpfh",
                FormPreset::new(["make", "model", "serial", "capacity"]).titled("FPFH units"),
            ),
        ];
        Self {
            forms: forms
                .into_iter()
                .map(|(name, preset)| (name.to_string(), preset))
                .collect(),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let catalog: Self = toml::from_str(contents)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::parse(&contents)
    }

    /// Built-ins plus the catalog named in `settings`, if any.
    pub fn for_settings(settings: &GridSettings) -> Result<Self, ConfigError> {
        let mut catalog = Self::builtin();
        if let Some(path) = &settings.forms_catalog {
            let extra = Self::load_from(path)?;
            log::info!("loaded {} form preset(s) from {}", extra.forms.len(), path.display());
            catalog.merge(extra);
        }
        Ok(catalog)
    }

    /// Presets in `other` replace same-named ones here.
    pub fn merge(&mut self, other: FormCatalog) {
        self.forms.extend(other.forms);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.forms
            .iter()
            .try_for_each(|(name, preset)| preset.validate(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Result<&FormPreset, ConfigError> {
        self.forms
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }

    pub fn resolve(
        &self,
        name: &str,
        settings: &GridSettings,
    ) -> Result<ResolvedForm, ConfigError> {
        let preset = self.get(name)?;
        preset.validate(name)?;
        Ok(ResolvedForm {
            name: name.to_string(),
            schema: preset.schema(name)?,
            options: preset.options(settings),
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}
