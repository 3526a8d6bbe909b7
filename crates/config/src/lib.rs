// Configuration loading

pub mod error;
pub mod forms;
pub mod settings;

pub use error::ConfigError;
pub use forms::{FormCatalog, FormPreset, ResolvedForm};
pub use settings::GridSettings;
