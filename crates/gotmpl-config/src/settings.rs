//! Effective settings
//!
//! The flattened, defaulted view of the merged configuration that the
//! runtime consumes.

use crate::file::ConfigFile;
use serde::Serialize;
use std::path::PathBuf;

/// Default bound on concurrent async renders
pub const DEFAULT_MAX_INFLIGHT: usize = 8;

/// Largest accepted `max_inflight`
pub const MAX_INFLIGHT_LIMIT: usize = 65_536;

/// Artifact file name for an operating system family, as reported by
/// `std::env::consts::OS`. Anything that is neither Windows nor macOS
/// follows the Linux convention.
pub fn artifact_file_name_for(os: &str) -> &'static str {
    match os {
        "windows" => "renderer.dll",
        "macos" => "librenderer.dylib",
        _ => "librenderer.so",
    }
}

/// Artifact file name for the running platform
pub fn artifact_file_name() -> &'static str {
    artifact_file_name_for(std::env::consts::OS)
}

/// Directory of the running executable, falling back to the working directory
fn default_library_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Directory searched for the platform artifact
    pub library_dir: PathBuf,
    /// Explicit artifact path; wins over `library_dir`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_path: Option<PathBuf>,
    pub max_inflight: usize,
    pub serialize_calls: bool,
    pub strict_sentinels: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library_dir: default_library_dir(),
            library_path: None,
            max_inflight: DEFAULT_MAX_INFLIGHT,
            serialize_calls: false,
            strict_sentinels: true,
        }
    }
}

impl Settings {
    /// Flatten a merged config file onto the defaults
    pub fn from_file(file: &ConfigFile) -> Self {
        let mut settings = Self::default();
        if let Some(library) = &file.library {
            if let Some(dir) = &library.dir {
                settings.library_dir = dir.clone();
            }
            settings.library_path = library.path.clone();
        }
        if let Some(runtime) = &file.runtime {
            settings.max_inflight = runtime.max_inflight.unwrap_or(settings.max_inflight);
            settings.serialize_calls = runtime.serialize_calls.unwrap_or(settings.serialize_calls);
        }
        if let Some(classify) = &file.classify {
            settings.strict_sentinels = classify
                .strict_sentinels
                .unwrap_or(settings.strict_sentinels);
        }
        settings
    }

    /// Settings pointing at an artifact directory, everything else default
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Full path of the native artifact
    pub fn artifact_path(&self) -> PathBuf {
        match &self.library_path {
            Some(path) => path.clone(),
            None => self.library_dir.join(artifact_file_name()),
        }
    }

    /// Render as TOML for display
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
