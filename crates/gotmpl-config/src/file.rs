//! Configuration file schema (gotmpl.toml, ~/.gotmpl/config.toml)
//!
//! Global and project files share one schema; the project file wins section
//! by section, key by key.

use crate::settings::MAX_INFLIGHT_LIMIT;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of one configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Native artifact location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<LibraryConfig>,

    /// Call scheduling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeConfig>,

    /// Native output classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classify: Option<ClassifyConfig>,
}

/// `[library]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Directory holding the platform artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Explicit artifact path, overrides `dir`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// `[runtime]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Upper bound on concurrently running async renders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_inflight: Option<usize>,

    /// Run every native call under one process-wide lock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialize_calls: Option<bool>,
}

/// `[classify]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ClassifyConfig {
    /// Treat unknown `*_ERROR:` prefixes as failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_sentinels: Option<bool>,
}

impl ConfigFile {
    /// Load a configuration file from disk
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config = Self::parse(&content).map_err(|e| match e {
            ParseFailure::Toml(error) => ConfigError::TomlParseError {
                file: path.to_path_buf(),
                error,
            },
            ParseFailure::Invalid(err) => err,
        })?;
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content).map_err(|e| match e {
            ParseFailure::Toml(error) => ConfigError::TomlParseError {
                file: PathBuf::from("<string>"),
                error,
            },
            ParseFailure::Invalid(err) => err,
        })
    }

    fn parse(content: &str) -> Result<Self, ParseFailure> {
        let config: Self = toml::from_str(content).map_err(ParseFailure::Toml)?;
        config.validate().map_err(ParseFailure::Invalid)?;
        Ok(config)
    }

    /// Validate value ranges that the schema cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(library) = &self.library {
            if library.dir.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                return Err(ConfigError::invalid("library.dir", "path must not be empty"));
            }
            if library.path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                return Err(ConfigError::invalid("library.path", "path must not be empty"));
            }
        }

        if let Some(runtime) = &self.runtime {
            match runtime.max_inflight {
                Some(0) => {
                    return Err(ConfigError::invalid(
                        "runtime.max_inflight",
                        "must be at least 1",
                    ))
                }
                Some(n) if n > MAX_INFLIGHT_LIMIT => {
                    return Err(ConfigError::invalid(
                        "runtime.max_inflight",
                        format!("must be at most {}", MAX_INFLIGHT_LIMIT),
                    ))
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Other config takes precedence for every key it sets. A `library.dir`
    /// on its own also drops an inherited `library.path`, which would
    /// otherwise shadow it.
    pub fn merge(&mut self, other: &ConfigFile) {
        if let Some(lib) = &other.library {
            let mine = self.library.get_or_insert_with(Default::default);
            if lib.dir.is_some() {
                mine.dir = lib.dir.clone();
                mine.path = None;
            }
            if lib.path.is_some() {
                mine.path = lib.path.clone();
            }
        }
        if let Some(rt) = &other.runtime {
            let mine = self.runtime.get_or_insert_with(Default::default);
            if rt.max_inflight.is_some() {
                mine.max_inflight = rt.max_inflight;
            }
            if rt.serialize_calls.is_some() {
                mine.serialize_calls = rt.serialize_calls;
            }
        }
        if let Some(cl) = &other.classify {
            let mine = self.classify.get_or_insert_with(Default::default);
            if cl.strict_sentinels.is_some() {
                mine.strict_sentinels = cl.strict_sentinels;
            }
        }
    }
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ConfigError),
}
