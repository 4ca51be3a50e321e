//! Main CLI application structure

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{line, option};
use crate::domain::{OptionStore, ScriptDocument};
use crate::storage::{Config, ScriptFile};

#[derive(Parser)]
#[command(name = "slurmscript")]
#[command(author, version, about = "Read, edit and rewrite SLURM batch scripts")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default locations
    #[arg(long, global = true, env = "SLURMSCRIPT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new batch script
    New {
        /// Script path
        path: PathBuf,

        /// Interpreter for the `#!` line
        #[arg(long, short = 'i')]
        interpreter: Option<String>,

        /// Initial option as KEY=VALUE (repeatable)
        #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the structure of a script
    Show {
        /// Script path
        path: PathBuf,
    },

    /// Rewrite a script in normalized form
    Fmt {
        /// Script path
        path: PathBuf,

        /// Only report whether the file would change
        #[arg(long)]
        check: bool,

        /// Justify directive keys (overrides config)
        #[arg(long)]
        indent: bool,
    },

    /// Read and edit `#SBATCH` options
    #[command(subcommand)]
    Opt(option::OptionCommands),

    /// Read and edit body lines
    #[command(subcommand)]
    Line(line::LineCommands),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("slurm_script=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = Output::new(cli.format);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    tracing::debug!(source = ?config.source, "configuration loaded");

    match cli.command {
        Commands::New {
            path,
            interpreter,
            options,
            force,
        } => new_script(&output, &config, &path, interpreter, &options, force)?,
        Commands::Show { path } => show_script(&output, &config, &path)?,
        Commands::Fmt {
            path,
            check,
            indent,
        } => format_script(&output, &config, &path, check, indent)?,
        Commands::Opt(cmd) => option::run(cmd, &output, &config)?,
        Commands::Line(cmd) => line::run(cmd, &output, &config)?,
    }

    Ok(())
}

/// Opens an existing script with the configured defaults
pub(super) fn open_script(config: &Config, path: &Path) -> Result<ScriptFile> {
    ScriptFile::open_with_config(path, config, false)
        .with_context(|| format!("Failed to open script: {}", path.display()))
}

/// Saves a script, creating parent directories if configured
pub(super) fn save_script(config: &Config, file: &ScriptFile) -> Result<()> {
    file.save(config.create_parent_dirs)
        .with_context(|| format!("Failed to save script: {}", file.path().display()))
}

/// Splits a `KEY=VALUE` argument
pub(super) fn parse_assignment(arg: &str) -> Result<(&str, &str)> {
    arg.split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected KEY=VALUE, got '{}'", arg))
}

fn new_script(
    output: &Output,
    config: &Config,
    path: &Path,
    interpreter: Option<String>,
    assignments: &[String],
    force: bool,
) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let mut options = OptionStore::new();
    let pairs = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>>>()?;
    options.update(pairs)?;

    let mut doc = ScriptDocument::with_options(options);
    doc.set_interpreter(interpreter.unwrap_or_else(|| config.default_interpreter.clone()));

    let file = ScriptFile::new(path, doc).with_style(config.dump_style());
    save_script(config, &file)?;

    if output.is_json() {
        output.json(&serde_json::json!({
            "path": path.display().to_string(),
            "interpreter": file.document().interpreter(),
            "options": file.document().options(),
        }))
    } else {
        output.status(&format!("Created script: {}", path.display()))
    }
}

fn show_script(output: &Output, config: &Config, path: &Path) -> Result<()> {
    let file = open_script(config, path)?;
    let doc = file.document();

    if output.is_json() {
        return output.json(doc);
    }

    output.text(&format!("Interpreter: {}", doc.interpreter()));
    output.text("");
    output.text(&format!("Options ({}):", doc.options().len()));
    for line in doc.options().to_string().lines() {
        output.text(&format!("  {}", line));
    }
    output.text("");
    output.text(&format!("Lines ({}):", doc.len()));
    for (i, entry) in doc.iter().enumerate() {
        output.text(&format!("{:>4}\t{}", i, entry));
    }

    Ok(())
}

fn format_script(output: &Output, config: &Config, path: &Path, check: bool, indent: bool) -> Result<()> {
    let original = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;

    let mut style = config.dump_style();
    style.indent |= indent;

    let file = open_script(config, path)?.with_style(style.clone());
    let formatted = file.document().dumps_with(&style);
    let changed = formatted != original;

    if check {
        if changed {
            anyhow::bail!("{} is not formatted", path.display());
        }
        return output.status(&format!("{} is formatted", path.display()));
    }

    if changed {
        save_script(config, &file)?;
        output.status(&format!("Formatted {}", path.display()))
    } else {
        output.status(&format!("{} unchanged", path.display()))
    }
}
