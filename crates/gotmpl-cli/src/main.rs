use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Render Go text/template templates through the native renderer.
///
/// The renderer is a shared library (librenderer.so, librenderer.dylib or
/// renderer.dll) located next to this executable unless configured otherwise.
///
/// EXAMPLES:
///     gotmpl render greeting.tmpl --set Name=World
///     gotmpl render report.tmpl --data data.json --output report.txt
///     cat data.json | gotmpl render report.tmpl --data -
///     gotmpl check
///     gotmpl config
///
/// ENVIRONMENT VARIABLES:
///     GOTMPL_LIBRARY_DIR       Directory holding the renderer artifact
///     GOTMPL_LIBRARY_PATH      Explicit path of the renderer artifact
///     GOTMPL_MAX_INFLIGHT      Concurrent async renders per engine
///     GOTMPL_SERIALIZE_CALLS   Run native calls one at a time
///     GOTMPL_STRICT_SENTINELS  Treat unknown *_ERROR: prefixes as failures
///     GOTMPL_LOG               Log filter (default: warn)
#[derive(Parser)]
#[command(name = "gotmpl")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that override where the renderer artifact is found
#[derive(Args, Debug, Clone, Default)]
pub struct LibraryArgs {
    /// Directory holding the renderer artifact
    #[arg(long, value_name = "DIR")]
    pub lib_dir: Option<PathBuf>,
    /// Explicit path of the renderer artifact
    #[arg(long = "lib", value_name = "PATH", conflicts_with = "lib_dir")]
    pub lib: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template file with JSON data
    ///
    /// Data comes from --data (a JSON file, or - for stdin) and is then
    /// amended by each --set. Without --data the template renders against
    /// an empty object.
    ///
    /// EXAMPLES:
    ///     gotmpl render hello.tmpl --set Name=World
    ///     gotmpl render hello.tmpl --data data.json --set user.age=30
    ///     gotmpl render hello.tmpl --data - --async
    #[command(visible_alias = "r")]
    Render {
        /// Path to the template file
        template: PathBuf,
        /// JSON data file, or - to read stdin
        #[arg(long, short = 'd', value_name = "FILE")]
        data: Option<String>,
        /// Set a data field; dotted keys create nested objects
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Render on the blocking worker pool of an async runtime
        #[arg(long = "async")]
        use_async: bool,
        /// Write the result to a file instead of stdout
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
        #[command(flatten)]
        library: LibraryArgs,
    },

    /// Report where the renderer artifact resolves and whether it loads
    ///
    /// EXAMPLES:
    ///     gotmpl check
    ///     gotmpl check --lib-dir ./target/go --json
    Check {
        /// Output the report as JSON
        #[arg(long, env = "GOTMPL_JSON")]
        json: bool,
        #[command(flatten)]
        library: LibraryArgs,
    },

    /// Print the effective configuration as TOML
    Config {
        #[command(flatten)]
        library: LibraryArgs,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("GOTMPL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render {
            template,
            data,
            set,
            use_async,
            output,
            library,
        } => {
            let options = commands::render::RenderArgs {
                template,
                data,
                set,
                use_async,
                output,
            };
            commands::render::run(&options, &library)?;
        }
        Commands::Check { json, library } => {
            commands::check::run(&library, json)?;
        }
        Commands::Config { library } => {
            commands::config::run(&library)?;
        }
    }

    Ok(())
}
