//! Render command - render a template file with JSON data

use crate::commands::resolve_settings;
use crate::LibraryArgs;
use anyhow::{anyhow, bail, Context, Result};
use gotmpl_runtime::{BridgeError, Engine};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;

/// Parsed `render` arguments
#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub template: PathBuf,
    pub data: Option<String>,
    pub set: Vec<String>,
    pub use_async: bool,
    pub output: Option<PathBuf>,
}

pub fn run(args: &RenderArgs, library: &LibraryArgs) -> Result<()> {
    let template = fs::read_to_string(&args.template)
        .with_context(|| format!("Failed to read template file: {}", args.template.display()))?;
    let data = build_data(args.data.as_deref(), &args.set)?;

    let settings = resolve_settings(library)?;
    let engine = Engine::with_settings(template, &settings).map_err(describe)?;
    debug!(template = %args.template.display(), use_async = args.use_async, "rendering");

    let result = if args.use_async {
        let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
        runtime.block_on(engine.render_async(data))
    } else {
        engine.render(&data)
    };
    let rendered = result.map_err(describe)?;

    match &args.output {
        Some(path) => fs::write(path, &rendered)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Prefix bridge errors with their kind
fn describe(err: BridgeError) -> anyhow::Error {
    let kind = err.kind();
    anyhow!(err).context(format!("render failed ({:?})", kind))
}

/// Assemble the render data from `--data` and `--set`
fn build_data(source: Option<&str>, assignments: &[String]) -> Result<Value> {
    let mut data = match source {
        None => Value::Object(Map::new()),
        Some("-") => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read data from stdin")?;
            serde_json::from_str(&text).context("Data on stdin is not valid JSON")?
        }
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read data file: {}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Data file is not valid JSON: {}", path))?
        }
    };

    for assignment in assignments {
        apply_assignment(&mut data, assignment)?;
    }
    Ok(data)
}

/// Apply one `KEY=VALUE`; the value is JSON when it parses, text otherwise
fn apply_assignment(data: &mut Value, assignment: &str) -> Result<()> {
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", assignment))?;
    if key.is_empty() || key.split('.').any(str::is_empty) {
        bail!("Invalid key in '{}'", assignment);
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut current = data;
    let mut fields = key.split('.').peekable();
    while let Some(field) = fields.next() {
        let Value::Object(map) = current else {
            bail!("Cannot set '{}': the data at that point is not an object", key);
        };
        if fields.peek().is_none() {
            map.insert(field.to_string(), value);
            return Ok(());
        }
        current = map
            .entry(field.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    Ok(())
}
