//! Config command - print the effective settings

use crate::commands::resolve_settings;
use crate::LibraryArgs;
use anyhow::{Context, Result};

pub fn run(library: &LibraryArgs) -> Result<()> {
    let settings = resolve_settings(library)?;
    let rendered = settings
        .to_toml()
        .context("Failed to format settings as TOML")?;

    print!("{}", rendered);
    println!("# artifact: {}", settings.artifact_path().display());
    Ok(())
}
