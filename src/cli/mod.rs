//! # Command-Line Interface
//!
//! A thin front end over the document API. Every command reads a script,
//! applies one change and writes it back.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Whole scripts | `new`, `show`, `fmt` |
//! | Options | `#SBATCH` directives | `opt get`, `opt set`, `opt require` |
//! | Lines | Script body | `line add --after`, `line find`, `line match` |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! `--verbose` (or `-v`) enables debug logging on stderr. Without it the
//! `RUST_LOG` filter applies.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod option;
mod line;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
