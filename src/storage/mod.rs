//! # Storage Layer
//!
//! File access and configuration for batch scripts.
//!
//! ## Key Types
//!
//! - [`ScriptFile`] - A script document bound to a path on disk
//! - [`Config`] - Global and local configuration
//!
//! All writes are atomic (temp file + rename). Nothing reaches the disk
//! until a save is requested.

mod config;
mod script_file;

pub use config::{Config, ConfigError, FormatConfig, LineSeparator, LOCAL_CONFIG_FILE};
pub use script_file::{read_script, write_script, ScriptFile, ScriptFileError};
