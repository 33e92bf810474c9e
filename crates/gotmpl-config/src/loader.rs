//! Configuration Loader
//!
//! Loads configuration from multiple sources and merges them with proper precedence.

use crate::file::ConfigFile;
use crate::settings::Settings;
use crate::{ConfigError, ConfigResult, PROJECT_CONFIG_FILE};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Precedence, lowest first:
/// 1. Global config (~/.gotmpl/config.toml)
/// 2. Project config (gotmpl.toml)
/// 3. Environment variables (GOTMPL_*)
/// 4. CLI flags - handled by caller
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use a specific global config file instead of ~/.gotmpl/config.toml
    pub fn with_global_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load settings starting from the given directory
    ///
    /// Walks up the directory tree to find gotmpl.toml, merges it over the
    /// global config if one exists, then applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Settings> {
        let mut merged = self.load_global_config()?;
        if let Some(project) = self.find_project_config(start_dir)? {
            merged.merge(&project);
        }
        merged.merge(&env_overrides()?);
        Ok(Settings::from_file(&merged))
    }

    /// Load settings from one explicit project file (plus global and env)
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Settings> {
        let mut merged = self.load_global_config()?;
        merged.merge(&ConfigFile::load_from_file(config_path)?);
        merged.merge(&env_overrides()?);
        Ok(Settings::from_file(&merged))
    }

    /// Find gotmpl.toml by walking up the directory tree
    fn find_project_config(&self, start_dir: &Path) -> ConfigResult<Option<ConfigFile>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                return ConfigFile::load_from_file(&config_path).map(Some);
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok(None),
            }
        }
    }

    /// Global config is optional; a missing file yields the empty config
    fn load_global_config(&mut self) -> ConfigResult<ConfigFile> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match Self::global_config_path() {
                Ok(path) => {
                    self.global_config_path = Some(path.clone());
                    path
                }
                // No home directory means no global config
                Err(ConfigError::HomeNotFound) => return Ok(ConfigFile::default()),
                Err(e) => return Err(e),
            },
        };

        if !path.exists() {
            return Ok(ConfigFile::default());
        }

        ConfigFile::load_from_file(&path)
    }

    /// Get the global configuration file path (~/.gotmpl/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".gotmpl").join("config.toml"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment variables follow the pattern GOTMPL_<KEY>
fn env_overrides() -> ConfigResult<ConfigFile> {
    let mut config = ConfigFile::default();

    if let Ok(dir) = env::var("GOTMPL_LIBRARY_DIR") {
        config.library.get_or_insert_with(Default::default).dir = Some(PathBuf::from(dir));
    }

    if let Ok(path) = env::var("GOTMPL_LIBRARY_PATH") {
        config.library.get_or_insert_with(Default::default).path = Some(PathBuf::from(path));
    }

    if let Ok(raw) = env::var("GOTMPL_MAX_INFLIGHT") {
        let value = raw.trim().parse::<usize>().map_err(|_| {
            ConfigError::invalid("GOTMPL_MAX_INFLIGHT", format!("not a number: '{}'", raw))
        })?;
        config.runtime.get_or_insert_with(Default::default).max_inflight = Some(value);
    }

    if let Ok(raw) = env::var("GOTMPL_SERIALIZE_CALLS") {
        config.runtime.get_or_insert_with(Default::default).serialize_calls =
            Some(parse_bool(&raw));
    }

    if let Ok(raw) = env::var("GOTMPL_STRICT_SENTINELS") {
        config.classify.get_or_insert_with(Default::default).strict_sentinels =
            Some(parse_bool(&raw));
    }

    config.validate()?;
    Ok(config)
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes")
}
