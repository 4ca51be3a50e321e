//! Option CLI commands

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use super::app::{open_script, parse_assignment, save_script};
use super::output::Output;
use crate::domain::{external_key, normalize_key, OPTION_NAMES};
use crate::storage::Config;

#[derive(Subcommand)]
pub enum OptionCommands {
    /// Print the value of an option
    Get {
        /// Script path
        path: PathBuf,

        /// Option name (`job-name` or `job_name`)
        key: String,
    },

    /// Set one or more options
    Set {
        /// Script path
        path: PathBuf,

        /// Assignments as KEY=VALUE
        #[arg(required = true, value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },

    /// Remove an option
    Unset {
        /// Script path
        path: PathBuf,

        /// Option name
        key: String,
    },

    /// Fail unless every given option is set
    Require {
        /// Script path
        path: PathBuf,

        /// Option names
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// List the recognized option names
    Names,
}

pub fn run(cmd: OptionCommands, output: &Output, config: &Config) -> Result<()> {
    match cmd {
        OptionCommands::Get { path, key } => get_option(output, config, &path, &key),
        OptionCommands::Set { path, assignments } => set_options(output, config, &path, &assignments),
        OptionCommands::Unset { path, key } => unset_option(output, config, &path, &key),
        OptionCommands::Require { path, keys } => require_options(output, config, &path, &keys),
        OptionCommands::Names => list_names(output),
    }
}

fn get_option(output: &Output, config: &Config, path: &Path, key: &str) -> Result<()> {
    let file = open_script(config, path)?;
    let value = file
        .document()
        .options()
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Option not set: {}", normalize_key(key)))?;

    if output.is_json() {
        output.json(&serde_json::json!({
            "key": normalize_key(key),
            "value": value,
        }))
    } else {
        output.text(value);
        Ok(())
    }
}

fn set_options(output: &Output, config: &Config, path: &Path, assignments: &[String]) -> Result<()> {
    let pairs = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>>>()?;

    let mut file = open_script(config, path)?;
    file.document_mut().options_mut().update(pairs.iter().copied())?;
    save_script(config, &file)?;

    if output.is_json() {
        return output.json(file.document().options());
    }
    for (key, value) in &pairs {
        output.status(&format!("Set {} = {}", external_key(&normalize_key(key)), value.trim()))?;
    }
    Ok(())
}

fn unset_option(output: &Output, config: &Config, path: &Path, key: &str) -> Result<()> {
    let mut file = open_script(config, path)?;
    let removed = file.document_mut().options_mut().delete(key);

    match removed {
        Some(value) => {
            save_script(config, &file)?;
            output.status(&format!("Removed {} (was {})", normalize_key(key), value))
        }
        None => output.status(&format!("Option not set: {}", normalize_key(key))),
    }
}

fn require_options(output: &Output, config: &Config, path: &Path, keys: &[String]) -> Result<()> {
    let file = open_script(config, path)?;
    let options = file.document().options();

    if options.require(keys) {
        return output.status("All required options are set");
    }

    let missing = options.missing(keys);
    if output.is_json() {
        output.json(&serde_json::json!({ "missing": missing }))?;
    }
    anyhow::bail!("Missing required options: {}", missing.join(", "))
}

fn list_names(output: &Output) -> Result<()> {
    if output.is_json() {
        return output.json(OPTION_NAMES);
    }
    for name in OPTION_NAMES {
        output.text(&external_key(name));
    }
    Ok(())
}
