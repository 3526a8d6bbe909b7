use std::path::PathBuf;

use surveygrid_engine::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid form catalog: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot encode form catalog: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// `min_columns` must be at least 1.
    #[error("{context}: min_columns must be at least 1")]
    ZeroMinColumns { context: String },

    #[error("form '{form}': {source}")]
    Schema {
        form: String,
        #[source]
        source: GridError,
    },

    #[error("form '{form}': field key at position {position} is empty")]
    EmptyFieldKey { form: String, position: usize },

    #[error("unknown form preset '{0}'")]
    UnknownPreset(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
