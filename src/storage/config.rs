//! Configuration handling
//!
//! Configuration is read from `~/.config/slurm-script/config.toml` (global)
//! and the nearest `.slurmscript.toml` in the current directory or one of
//! its parents (local). Local settings replace global ones.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DumpStyle, DEFAULT_INTERPRETER};

/// File name of the local configuration
pub const LOCAL_CONFIG_FILE: &str = ".slurmscript.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Line ending used when writing scripts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineSeparator {
    #[default]
    Lf,
    Crlf,
}

impl LineSeparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineSeparator::Lf => "\n",
            LineSeparator::Crlf => "\r\n",
        }
    }
}

/// How scripts are rendered
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FormatConfig {
    /// Justify directive keys to a fixed column
    pub indent_directives: bool,

    /// Line ending for written scripts
    pub line_separator: LineSeparator,
}

/// Settings for reading and writing scripts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Interpreter for new scripts and scripts without a `#!` line
    pub default_interpreter: String,

    /// Create missing parent directories when saving
    pub create_parent_dirs: bool,

    /// Rendering settings
    pub format: FormatConfig,

    /// File the settings were read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_interpreter: DEFAULT_INTERPRETER.to_string(),
            create_parent_dirs: false,
            format: FormatConfig::default(),
            source: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let local = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_local_config(&dir));

        match local {
            Some(path) => Self::from_file(&path),
            None => Self::load_global(),
        }
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "slurm-script", "slurm-script")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration, falling back to defaults
    fn load_global() -> Result<Self> {
        let path = match Self::global_config_dir() {
            Some(dir) => dir.join("config.toml"),
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    /// Reads configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Finds the nearest local config file by walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(LOCAL_CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the rendering style for [`ScriptDocument::dumps_with`](crate::domain::ScriptDocument::dumps_with)
    pub fn dump_style(&self) -> DumpStyle {
        DumpStyle {
            line_separator: self.format.line_separator.as_str().to_string(),
            indent: self.format.indent_directives,
        }
    }
}
