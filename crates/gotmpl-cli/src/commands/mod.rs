pub mod check;
pub mod config;
pub mod render;

use crate::LibraryArgs;
use anyhow::{Context, Result};
use gotmpl_config::{ConfigLoader, Settings};

/// Load settings for the working directory and apply the library flags
///
/// `--lib` replaces any configured artifact path; `--lib-dir` also clears a
/// configured path so the directory is actually used. Relative flag values
/// resolve against the working directory, not the dynamic loader's search
/// path.
pub fn resolve_settings(library: &LibraryArgs) -> Result<Settings> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let mut settings = ConfigLoader::new()
        .load_from_directory(&cwd)
        .context("Failed to load gotmpl configuration")?;

    if let Some(dir) = &library.lib_dir {
        settings.library_dir = cwd.join(dir);
        settings.library_path = None;
    }
    if let Some(path) = &library.lib {
        settings.library_path = Some(cwd.join(path));
    }

    Ok(settings)
}
