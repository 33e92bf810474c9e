//! gotmpl configuration
//!
//! Resolves where the native renderer artifact lives and how the bridge
//! schedules calls into it.
//!
//! # Configuration Hierarchy
//!
//! Sources are merged in the following order (later overrides earlier):
//! 1. Global config (~/.gotmpl/config.toml)
//! 2. Project config (gotmpl.toml, searched upwards from the working directory)
//! 3. Environment variables (GOTMPL_*)
//! 4. CLI flags (applied by the caller on the returned [`Settings`])
//!
//! # Example
//!
//! ```no_run
//! use gotmpl_config::ConfigLoader;
//! use std::path::Path;
//!
//! let settings = ConfigLoader::new().load_from_directory(Path::new(".")).unwrap();
//! println!("{}", settings.artifact_path().display());
//! ```

pub mod file;
pub mod loader;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use file::{ClassifyConfig, ConfigFile, LibraryConfig, RuntimeConfig};
pub use loader::ConfigLoader;
pub use settings::{artifact_file_name, Settings};

/// File name of the project configuration
pub const PROJECT_CONFIG_FILE: &str = "gotmpl.toml";
