//! slurm-script - SLURM batch scripts as structured documents
//!
//! A script is parsed into an interpreter line, an ordered store of
//! validated `#SBATCH` options and a sequence of body lines. All three can
//! be edited in memory and written back without losing meaning.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Field, LineEntry, OptionStore, ScriptDocument, ScriptError};
pub use storage::{Config, ScriptFile};
