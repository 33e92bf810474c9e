//! Check command - report whether the renderer artifact resolves and loads

use crate::commands::resolve_settings;
use crate::LibraryArgs;
use anyhow::{bail, Result};
use gotmpl_runtime::LibraryLoader;

pub fn run(library: &LibraryArgs, json: bool) -> Result<()> {
    let settings = resolve_settings(library)?;
    let loader = LibraryLoader::from_settings(&settings);
    let path = loader.artifact_path();
    let exists = path.exists();
    let load_error = if exists {
        loader.ensure_loaded().err().map(|e| e.to_string())
    } else {
        Some(format!("no file at {}", path.display()))
    };
    let loaded = load_error.is_none();

    if json {
        let report = serde_json::json!({
            "path": path.display().to_string(),
            "exists": exists,
            "loaded": loaded,
            "error": load_error,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("library: {}", path.display());
        println!("exists:  {}", yes_no(exists));
        match &load_error {
            None => println!("loads:   yes"),
            Some(reason) => println!("loads:   no ({})", reason),
        }
    }

    if !loaded {
        bail!("renderer library is not usable");
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
