//! Domain models for batch scripts
//!
//! Contains the document model without any I/O concerns.

mod vocabulary;
mod options;
mod line;
mod script;
mod submit;

pub use vocabulary::{external_key, is_known_option, normalize_key, OPTION_NAMES};
pub use options::{Directive, OptionError, OptionStore, DIRECTIVE_PREFIX};
pub use line::{Field, LineEntry, COMMENT_MARKER};
pub use script::{DumpStyle, ScriptDocument, ScriptError, DEFAULT_INTERPRETER, INTERPRETER_MARKER};
pub use submit::{JobHandle, Submitter};
