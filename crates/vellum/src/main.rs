use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vellum::config::Config;
use vellum::{Sanitizer, normalize_editorial_html};

#[derive(Parser)]
#[command(name = "vellum", about = "Sanitize and normalize editorial rich text")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode, promote and demote headings without sanitizing. Not safe to render.
    Normalize(Input),
    /// Sanitize an HTML fragment as-is.
    Sanitize(Input),
    /// Normalize, then sanitize.
    Render(Input),
    /// Report input format and structure of the rendered output as JSON.
    Diagnose(Input),
}

#[derive(Args)]
struct Input {
    /// Directory holding `vellum.toml` (defaults to current directory).
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Content file to read; reads stdin when omitted.
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Command::Normalize(input) => normalize_editorial_html(&read_input(input.file.as_deref())?),
        Command::Sanitize(input) => {
            let sanitizer = load_sanitizer(&input.root)?;
            sanitizer.sanitize(&read_input(input.file.as_deref())?)
        }
        Command::Render(input) => {
            let sanitizer = load_sanitizer(&input.root)?;
            sanitizer.render(&read_input(input.file.as_deref())?)
        }
        Command::Diagnose(input) => {
            let sanitizer = load_sanitizer(&input.root)?;
            let diagnostics = sanitizer.diagnose(&read_input(input.file.as_deref())?);
            serde_json::to_string_pretty(&diagnostics).context("failed to encode diagnostics")?
        }
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}").context("failed to write output")?;
    Ok(())
}

fn load_sanitizer(root: &Path) -> Result<Sanitizer> {
    let config = Config::load(root).context("failed to load config")?;
    debug!(site_origin = %config.site_origin, "loaded config");
    Sanitizer::from_config(&config)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
